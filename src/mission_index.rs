use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the mission manifest. Field names stay camelCase on the
/// wire for the viewers that already consume `missions.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionEntry {
    pub id: String,
    pub name: String,
    pub folder: String,
    pub json_file: String,
    pub csv_file: String,
    pub usbl_file: Option<String>,
    pub start_time: Option<String>,
    pub date: Option<String>,
}

/// Scans a data directory for mission folders and builds a manifest,
/// newest first.
///
/// A mission folder is named `YYYYMMDDHHMMSS-Name` or plain `Name` and must
/// pair a `mission_travel_path.csv` with a mission JSON (preferring
/// `<Name>.json`, otherwise any JSON that is not `mission_summary.json`).
/// Any other CSV is treated as the optional secondary-tracking file.
/// Folders missing either required file are skipped. This is filesystem
/// glue around the analytical core, which only ever sees resolved file
/// contents.
pub fn build_index(data_dir: &Path) -> Result<Vec<MissionEntry>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(data_dir).with_context(|| format!("reading {}", data_dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    folders.sort();

    let mut missions = Vec::new();
    for folder in folders {
        let dir_path = data_dir.join(&folder);
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir_path)? {
            files.push(entry?.file_name().to_string_lossy().into_owned());
        }

        let expected_name = mission_name_from_folder(&folder);
        let expected_json = format!("{}.json", expected_name);
        let json_file = files
            .iter()
            .find(|f| **f == expected_json)
            .or_else(|| {
                files
                    .iter()
                    .find(|f| f.ends_with(".json") && *f != "mission_summary.json")
            })
            .cloned();
        let csv_file = files.iter().find(|f| **f == "mission_travel_path.csv").cloned();
        let usbl_file = files
            .iter()
            .find(|f| f.ends_with(".csv") && *f != "mission_travel_path.csv")
            .cloned();

        let (start_time, date) = read_mission_start(&dir_path.join("mission_summary.json"));

        if let (Some(json_file), Some(csv_file)) = (json_file, csv_file) {
            let name = json_file.trim_end_matches(".json").to_string();
            missions.push(MissionEntry {
                id: folder.clone(),
                name,
                folder,
                json_file,
                csv_file,
                usbl_file,
                start_time,
                date,
            });
        }
    }

    // Newest first: by date, then start time within a day, falling back to
    // the folder name.
    missions.sort_by(|a, b| {
        if let (Some(a_date), Some(b_date)) = (&a.date, &b.date) {
            if a_date != b_date {
                return b_date.cmp(a_date);
            }
            if let (Some(a_start), Some(b_start)) = (&a.start_time, &b.start_time) {
                return b_start.cmp(a_start);
            }
        }
        b.folder.cmp(&a.folder)
    });

    Ok(missions)
}

/// Folder format is `YYYYMMDDHHMMSS-MissionName` or just `MissionName`.
fn mission_name_from_folder(folder: &str) -> String {
    let parts: Vec<&str> = folder.split('-').collect();
    if parts.len() > 1 && parts[0].len() == 14 && parts[0].chars().all(|c| c.is_ascii_digit()) {
        parts[1..].join("-")
    } else {
        folder.to_string()
    }
}

/// Pulls `mission_start_sys_time` (format `YYYYMMDDHHmmss.ffffff`) out of
/// the summary file, returning (start_time, YYYYMMDD date). Both are `None`
/// when the summary is missing or unreadable.
fn read_mission_start(summary_path: &Path) -> (Option<String>, Option<String>) {
    let doc: Value = match fs::read_to_string(summary_path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("could not parse {}: {}", summary_path.display(), err);
                return (None, None);
            }
        },
        Err(_) => return (None, None),
    };

    let start_time = match doc.get("mission_start_sys_time") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let date = start_time.as_deref().and_then(|s| {
        let digits = s.split('.').next().unwrap_or(s);
        if digits.len() >= 8 {
            Some(digits[..8].to_string())
        } else {
            None
        }
    });

    (start_time, date)
}
