use ordertrack_core::timeline::badge_label;

use crate::commands::{load_snapshot, CommandResult};

pub fn run(input: &str) -> CommandResult {
    match load_snapshot(input) {
        Ok(snapshot) => CommandResult::success("badge", badge_label(&snapshot)),
        Err(error) => CommandResult::from_error("badge", &error),
    }
}
