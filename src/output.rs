//! Terminal rendering for command results.
//!
//! Results go to stdout and run summaries to stderr; each is colored only
//! when the stream it is written to is a terminal.

use crate::app::RunOutcome;
use crate::navigator::NavOutcome;
use crate::routing::RouteSummary;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Whether output written to `stream` should get ANSI colors.
pub fn use_color(stream: &impl IsTerminal) -> bool {
    stream.is_terminal()
}

/// Route summary followed by numbered steps.
pub fn render_route(route: &RouteSummary, color: bool) -> String {
    let mut out = if color {
        route.summary.bold().to_string()
    } else {
        route.summary.clone()
    };

    let width = route.steps.len().to_string().len();
    for (index, step) in route.steps.iter().enumerate() {
        let number = format!("{:>width$}.", index + 1);
        if color {
            out.push_str(&format!("\n  {} {}", number.dimmed(), step));
        } else {
            out.push_str(&format!("\n  {} {}", number, step));
        }
    }
    out
}

/// One-line description of how a navigation run ended.
pub fn render_outcome(outcome: &RunOutcome, color: bool) -> String {
    let (ok, message) = match outcome {
        RunOutcome::Navigated(NavOutcome::Completed { steps }) => {
            (true, format!("Route spoken ({steps} steps)"))
        }
        RunOutcome::Navigated(NavOutcome::NoDestination) => {
            (false, "No destination heard".to_string())
        }
        RunOutcome::Navigated(NavOutcome::Unresolved { destination }) => {
            (false, format!("Could not resolve '{destination}'"))
        }
        RunOutcome::Navigated(NavOutcome::BackendMissing) => {
            (false, "Routing backend is not running".to_string())
        }
        RunOutcome::Navigated(NavOutcome::NoRoute) => (false, "No route found".to_string()),
        RunOutcome::NoFix => (false, "No position fix before the deadline".to_string()),
        RunOutcome::Unavailable { reason } => (false, format!("Navigation unavailable: {reason}")),
        RunOutcome::Interrupted => (false, "Interrupted".to_string()),
    };

    match (color, ok) {
        (false, _) => message,
        (true, true) => message.green().to_string(),
        (true, false) => message.yellow().to_string(),
    }
}
