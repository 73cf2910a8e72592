use ordertrack_core::config::AppConfig;
use ordertrack_core::{resolve_timeline_with, ApplicationError, ResolvedTimeline};

use crate::commands::{load_snapshot, render_payload, CommandResult};

pub fn run(config: &AppConfig, input: &str, pretty: bool) -> CommandResult {
    match resolve(config, input) {
        Ok(timeline) => render_payload("resolve", &timeline, pretty),
        Err(error) => CommandResult::from_error("resolve", &error),
    }
}

fn resolve(config: &AppConfig, input: &str) -> Result<ResolvedTimeline, ApplicationError> {
    let snapshot = load_snapshot(input)?;
    Ok(resolve_timeline_with(&snapshot, &config.timeline.options()))
}
