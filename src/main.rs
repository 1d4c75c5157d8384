use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;

use mission_path_rs::color::depth_color;
use mission_path_rs::loader;
use mission_path_rs::pipeline::{analyze, AnalysisConfig, MissionAnalysis};

#[derive(Parser, Debug)]
#[command(name = "mission_path")]
#[command(about = "Analyze an underwater mission telemetry trace against its planned route", long_about = None)]
struct Args {
    /// Telemetry CSV (optionally .csv.gz)
    #[arg(long)]
    telemetry: PathBuf,

    /// Mission JSON with the planned waypoints
    #[arg(long)]
    mission: Option<PathBuf>,

    /// Analysis config JSON overriding thresholds/window/display cap
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, default_value = "800x600")]
    canvas: String,

    /// Output JSON path (default: mission_analysis_<timestamp>.json)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ActualPoint {
    x: f64,
    y: f64,
    depth: f64,
    color: String,
}

#[derive(Serialize)]
struct PlannedPoint {
    x: f64,
    y: f64,
    waypoint_number: u32,
}

#[derive(Serialize)]
struct IncidentMarker {
    x: f64,
    y: f64,
    count: usize,
    primary_reason: String,
}

/// Everything a renderer needs to draw the scene: the analysis values plus
/// every layer already projected onto the requested canvas.
#[derive(Serialize)]
struct RenderOutput {
    canvas_width: f64,
    canvas_height: f64,
    analysis: MissionAnalysis,
    actual_points: Vec<ActualPoint>,
    planned_points: Vec<PlannedPoint>,
    incident_markers: Vec<IncidentMarker>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (canvas_width, canvas_height) = parse_canvas(&args.canvas)?;

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<AnalysisConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    println!("[{}] Loading telemetry from {}", ts_now(), args.telemetry.display());
    let telemetry = loader::load_telemetry(&args.telemetry)?;

    let waypoints = match &args.mission {
        Some(path) => {
            println!("[{}] Loading mission from {}", ts_now(), path.display());
            loader::load_mission(path)?
        }
        None => Vec::new(),
    };

    let analysis = analyze(&telemetry, &waypoints, &config)?;
    let transform = analysis.transform(canvas_width, canvas_height);

    let actual_points: Vec<ActualPoint> = analysis
        .sampled
        .iter()
        .map(|s| {
            let (x, y) = transform.project(s.latitude, s.longitude);
            ActualPoint {
                x,
                y,
                depth: s.depth,
                color: depth_color(s.depth, &analysis.depth_range).to_string(),
            }
        })
        .collect();

    let planned_points: Vec<PlannedPoint> = analysis
        .waypoints
        .iter()
        .map(|w| {
            let (x, y) = transform.project(w.latitude, w.longitude);
            PlannedPoint {
                x,
                y,
                waypoint_number: w.number,
            }
        })
        .collect();

    let incident_markers: Vec<IncidentMarker> = analysis
        .reports
        .iter()
        .map(|r| {
            let (x, y) = transform.project(r.latitude, r.longitude);
            IncidentMarker {
                x,
                y,
                count: r.member_count,
                primary_reason: r.primary_reason.clone(),
            }
        })
        .collect();

    println!("\n=== Mission Summary ===");
    println!(
        "Telemetry samples: {} ({} displayed)",
        telemetry.len(),
        analysis.sampled.len()
    );
    println!("Waypoints: {}", analysis.waypoints.len());
    println!(
        "Depth range: {:.2} - {:.2} m",
        analysis.depth_range.min, analysis.depth_range.max
    );
    println!("Incidents: {} clusters", analysis.reports.len());
    for report in &analysis.reports {
        println!(
            "  {:.6}, {:.6}  x{}  {}",
            report.latitude, report.longitude, report.member_count, report.primary_reason
        );
    }

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("mission_analysis_{}.json", ts_now_clean())));
    let output = RenderOutput {
        canvas_width,
        canvas_height,
        analysis,
        actual_points,
        planned_points,
        incident_markers,
    };
    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(&output_path, json)
        .with_context(|| format!("writing {}", output_path.display()))?;
    println!("[{}] Wrote {}", ts_now(), output_path.display());

    Ok(())
}

fn parse_canvas(spec: &str) -> Result<(f64, f64)> {
    let Some((w, h)) = spec.split_once('x') else {
        bail!("canvas must be WIDTHxHEIGHT, got {:?}", spec);
    };
    let width: f64 = w.parse().with_context(|| format!("canvas width {:?}", w))?;
    let height: f64 = h.parse().with_context(|| format!("canvas height {:?}", h))?;
    if width <= 0.0 || height <= 0.0 {
        bail!("canvas dimensions must be positive, got {:?}", spec);
    }
    Ok((width, height))
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}

fn ts_now_clean() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}
