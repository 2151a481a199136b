use crate::domain::models::{RunStatus, RunSummary, SessionStatus};
use crate::domain::orchestrator::Reachability;
use std::fmt::Write;

pub fn summary_text(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary: {}", headline(summary.status));

    for outcome in &summary.outcomes {
        let device = &outcome.device;
        match outcome.status {
            SessionStatus::Connected => {
                let address = outcome
                    .address
                    .map(|a| format!(" as {}", a))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  {:<12} connected on {}{} ({} attempt(s))",
                    device.name, device.interface, address, outcome.total_attempts
                );
            }
            SessionStatus::Failed => {
                let _ = writeln!(
                    out,
                    "  {:<12} failed on {}: {}",
                    device.name,
                    device.interface,
                    outcome.failure_detail()
                );
            }
        }
    }

    out
}

pub fn reachability_text(results: &[Reachability]) -> String {
    let mut out = String::new();
    for result in results {
        let state = match (result.status_code, &result.error) {
            (Some(200), _) => "reachable".to_string(),
            (Some(code), _) => format!("answered HTTP {}", code),
            (None, Some(error)) => format!("unreachable ({})", error),
            (None, None) => "unreachable".to_string(),
        };
        let _ = writeln!(out, "  {:<12} {:<8} {}", result.name, result.interface, state);
    }
    out
}

fn headline(status: RunStatus) -> &'static str {
    match status {
        RunStatus::AllConnected => "all cameras connected",
        RunStatus::PartialFailure => "some cameras failed",
        RunStatus::AllFailed => "no camera connected",
    }
}
