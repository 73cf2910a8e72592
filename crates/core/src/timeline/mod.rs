pub mod approvals;
pub mod labels;
pub mod stage;
pub mod steps;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::order::OrderSnapshot;

pub use approvals::{aggregate_approvals, ApprovalSummary};
pub use labels::badge_label;
pub use stage::{current_stage_number, StageProgress};
pub use steps::{
    build_steps, select_current_step, StepIcon, StepKey, TimelineOptions, TimelineStep,
    STEP_COUNT,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimeline {
    pub stage_number: u8,
    pub approvals: ApprovalSummary,
    pub steps: [TimelineStep; STEP_COUNT],
    pub current_step: TimelineStep,
    pub badge_label: String,
}

pub fn resolve_timeline(snapshot: &OrderSnapshot) -> ResolvedTimeline {
    resolve_timeline_with(snapshot, &TimelineOptions::default())
}

pub fn resolve_timeline_with(
    snapshot: &OrderSnapshot,
    options: &TimelineOptions,
) -> ResolvedTimeline {
    let approvals = aggregate_approvals(&snapshot.approvals);
    let progress = StageProgress::resolve(&snapshot.status, snapshot.execution_stage.as_ref());
    let steps = build_steps(snapshot, &approvals, progress, options);
    let current_step = select_current_step(&steps).clone();
    let badge_label = badge_label(snapshot);

    debug!(
        event_name = "timeline.resolved",
        order_id = snapshot.id.as_ref().map(|id| id.0.as_str()).unwrap_or("unknown"),
        status = %snapshot.status,
        execution_stage = snapshot
            .execution_stage
            .as_ref()
            .map(|stage| stage.as_str())
            .unwrap_or("none"),
        stage_number = progress.current,
        current_step = current_step.status_key.as_str(),
        "order timeline resolved"
    );

    ResolvedTimeline {
        stage_number: progress.current,
        approvals,
        steps,
        current_step,
        badge_label,
    }
}
