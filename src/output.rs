use crate::stats::ScenarioResult;

pub trait Formatter {
    fn write(&self, results: &[ScenarioResult]) -> String;
}

/// One block per scenario with every headline measure.
pub struct HumanFormatter;

/// One line per scenario, preceded by run-level metadata.
pub struct SummaryFormatter;

/// The full result set as pretty-printed JSON, outcomes included.
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, results: &[ScenarioResult]) -> String {
        let blocks: Vec<String> = results.iter().map(scenario_block).collect();
        blocks.join("\n")
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, results: &[ScenarioResult]) -> String {
        let mut out = String::new();
        out.push_str("Metadata:\n");
        out.push_str(&format!(
            "calls: {}\n",
            results.first().map_or(0, |result| result.total_calls)
        ));
        out.push_str(&format!("scenarios: {}\n", results.len()));
        out.push_str("Summary:\n");
        for result in results {
            out.push_str(&format!(
                "{}: {} handled (mean wait: {:.2} min, p95 wait: {})\n",
                units_label(result.capacity),
                result.handled_calls(),
                result.mean_wait(),
                p95_label(result),
            ));
        }
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, results: &[ScenarioResult]) -> String {
        let mut out = serde_json::to_string_pretty(results).unwrap_or_default();
        out.push('\n');
        out
    }
}

fn scenario_block(result: &ScenarioResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Scenario: {}\n", units_label(result.capacity)));
    out.push_str(&format!(
        "Calls: {} ({} simple, {} complex, {} dropped)\n",
        result.total_calls, result.simple_calls, result.complex_calls, result.dropped_calls
    ));
    out.push_str(&format!("Mean wait: {:.2} min\n", result.mean_wait()));
    out.push_str(&format!("P95 wait: {}\n", p95_label(result)));
    out.push_str(&format!("Mean service: {:.2} min\n", result.mean_service()));
    out.push_str(&format!(
        "Mean handling: {:.2} min\n",
        result.mean_handling()
    ));
    out.push_str(&format!("Makespan: {:.2} min\n", result.makespan));
    out
}

fn p95_label(result: &ScenarioResult) -> String {
    let mut waits = result.wait_times();
    waits.sort_unstable_by(f64::total_cmp);
    match nearest_rank_percentile(&waits, 95.0) {
        Some(wait) => format!("{:.2} min", wait),
        None => "n/a".to_string(),
    }
}

fn units_label(capacity: u32) -> String {
    if capacity == 1 {
        "1 unit".to_string()
    } else {
        format!("{} units", capacity)
    }
}

pub fn nearest_rank_percentile(sorted: &[f64], percentile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((percentile / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    Some(sorted[idx])
}
