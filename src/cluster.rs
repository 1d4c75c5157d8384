use crate::types::{IncidentFlag, IncidentReport};

/// Default clustering window in seconds.
pub const DEFAULT_CLUSTER_WINDOW_SECS: f64 = 5.0;

/// Groups incident flags into reports by temporal proximity to a seed.
///
/// Flags are processed in input order. Each not-yet-assigned flag seeds a
/// cluster, then every remaining unassigned flag whose absolute timestamp
/// difference *from the seed* is below `window_secs` joins it. Grouping is
/// deliberately non-transitive: two flags both within the window of the
/// seed merge even if they are further than the window from each other,
/// and a flag outside the seed's window never joins that cluster no matter
/// how close it sits to another member. Every flag lands in exactly one
/// cluster.
///
/// O(n^2) over the flag count, which is fine at the sizes missions produce
/// (thousands of flags). A timestamp-sorted sliding window would be a valid
/// optimization as long as it reproduces the seed-based grouping exactly.
pub fn cluster_flags(flags: &[IncidentFlag], window_secs: f64) -> Vec<IncidentReport> {
    let mut reports = Vec::new();
    let mut assigned = vec![false; flags.len()];

    for i in 0..flags.len() {
        if assigned[i] {
            continue;
        }

        let seed = &flags[i];
        let mut members = vec![seed.clone()];
        assigned[i] = true;

        for j in 0..flags.len() {
            if assigned[j] {
                continue;
            }
            if (seed.timestamp - flags[j].timestamp).abs() < window_secs {
                members.push(flags[j].clone());
                assigned[j] = true;
            }
        }

        reports.push(build_report(seed.timestamp, members));
    }

    reports
}

fn build_report(seed_timestamp: f64, members: Vec<IncidentFlag>) -> IncidentReport {
    let count = members.len();
    let latitude = members.iter().map(|m| m.latitude).sum::<f64>() / count as f64;
    let longitude = members.iter().map(|m| m.longitude).sum::<f64>() / count as f64;
    let all_reasons = rank_reasons(&members);
    let primary_reason = all_reasons.first().cloned().unwrap_or_default();

    IncidentReport {
        latitude,
        longitude,
        representative_timestamp: seed_timestamp,
        member_count: count,
        members,
        primary_reason,
        all_reasons,
    }
}

/// Distinct reasons across the cluster, most frequent first. The count
/// pass keeps first-encountered order so ties stay stable.
fn rank_reasons(members: &[IncidentFlag]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for member in members {
        for reason in &member.reasons {
            match counts.iter_mut().find(|(r, _)| r == reason) {
                Some((_, n)) => *n += 1,
                None => counts.push((reason.clone(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(reason, _)| reason).collect()
}
