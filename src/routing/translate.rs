//! Route instruction translation.
//!
//! Turns the first candidate path into a localized summary line plus one
//! line per instruction. Phrase rules are literal substitutions applied in
//! table order; steps are never reordered or merged.

use crate::config::{PhraseRule, RoutingConfig};
use crate::routing::types::RouteResponse;

/// Localized route ready to be printed or spoken.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    /// Rounded to the nearest minute.
    pub minutes: u64,
    pub summary: String,
    pub steps: Vec<String>,
}

impl RouteSummary {
    /// Summary first, then each step in route order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.summary.as_str()).chain(self.steps.iter().map(String::as_str))
    }
}

/// Translate a routing response.
///
/// `None` when there is no response or it carries no path.
pub fn translate(response: Option<&RouteResponse>, config: &RoutingConfig) -> Option<RouteSummary> {
    let path = response?.paths.first()?;

    let distance_km = path.distance / 1000.0;
    let minutes = (path.time / 60_000.0).round().max(0.0) as u64;
    let summary = config
        .summary_template
        .replace("{distance_km}", &format!("{distance_km:.1}"))
        .replace("{minutes}", &minutes.to_string());

    let steps = path
        .instructions
        .iter()
        .map(|instruction| {
            let meters = instruction.distance.round().max(0.0) as u64;
            // Distance first so instruction text is never re-expanded
            config
                .step_template
                .replace("{distance}", &meters.to_string())
                .replace("{text}", &localize(&instruction.text, &config.phrases))
        })
        .collect();

    Some(RouteSummary {
        distance_km,
        minutes,
        summary,
        steps,
    })
}

/// Apply every phrase rule in order.
pub fn localize(text: &str, rules: &[PhraseRule]) -> String {
    rules
        .iter()
        .filter(|rule| !rule.from.is_empty())
        .fold(text.to_string(), |acc, rule| acc.replace(&rule.from, &rule.to))
}
