use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::{ExecutionStage, OrderSnapshot, OrderStatus};
use crate::timeline::approvals::ApprovalSummary;
use crate::timeline::labels::step_label;
use crate::timeline::stage::StageProgress;

pub const STEP_COUNT: usize = 10;

pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";
pub const DEFAULT_REJECTION_FALLBACK: &str = "No reason provided";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Created,
    Pending,
    PendingExecution,
    InProgress,
    OrderExecuted,
    AwaitingPayment,
    AwaitingCollection,
    InCollection,
    Collected,
    Closed,
}

impl StepKey {
    pub const ORDER: [StepKey; STEP_COUNT] = [
        StepKey::Created,
        StepKey::Pending,
        StepKey::PendingExecution,
        StepKey::InProgress,
        StepKey::OrderExecuted,
        StepKey::AwaitingPayment,
        StepKey::AwaitingCollection,
        StepKey::InCollection,
        StepKey::Collected,
        StepKey::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::PendingExecution => "pending_execution",
            Self::InProgress => "in_progress",
            Self::OrderExecuted => "order_executed",
            Self::AwaitingPayment => "awaiting_payment",
            Self::AwaitingCollection => "awaiting_collection",
            Self::InCollection => "in_collection",
            Self::Collected => "collected",
            Self::Closed => "closed",
        }
    }

    pub fn icon(self) -> StepIcon {
        match self {
            Self::Created => StepIcon::FileText,
            Self::Pending => StepIcon::ClipboardCheck,
            Self::PendingExecution => StepIcon::CalendarClock,
            Self::InProgress => StepIcon::Hammer,
            Self::OrderExecuted => StepIcon::CheckCircle,
            Self::AwaitingPayment => StepIcon::CreditCard,
            Self::AwaitingCollection => StepIcon::PackageOpen,
            Self::InCollection => StepIcon::Truck,
            Self::Collected => StepIcon::PackageCheck,
            Self::Closed => StepIcon::Flag,
        }
    }
}

/// Icon tag handed to the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepIcon {
    FileText,
    ClipboardCheck,
    CalendarClock,
    Hammer,
    CheckCircle,
    CreditCard,
    PackageOpen,
    Truck,
    PackageCheck,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub status_key: StepKey,
    pub label: String,
    pub icon: StepIcon,
    pub date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub active: bool,
    pub rejected: bool,
    pub details: Option<String>,
}

impl TimelineStep {
    fn new(key: StepKey, completed: bool, active: bool) -> Self {
        Self {
            status_key: key,
            label: step_label(key).to_string(),
            icon: key.icon(),
            date: None,
            completed,
            active,
            rejected: false,
            details: None,
        }
    }

    fn dated(mut self, date: Option<DateTime<Utc>>) -> Self {
        self.date = date;
        self
    }

    fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Rendering knobs for step details. Nothing here changes step flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOptions {
    pub date_format: String,
    pub rejection_fallback: String,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            rejection_fallback: DEFAULT_REJECTION_FALLBACK.to_string(),
        }
    }
}

impl TimelineOptions {
    /// Falls back to RFC 3339 when `date_format` is not a usable strftime
    /// pattern.
    pub fn format_date(&self, date: DateTime<Utc>) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", date.format(&self.date_format)).is_err() {
            return date.to_rfc3339();
        }
        rendered
    }
}

pub fn build_steps(
    snapshot: &OrderSnapshot,
    approvals: &ApprovalSummary,
    progress: StageProgress,
    options: &TimelineOptions,
) -> [TimelineStep; STEP_COUNT] {
    use ExecutionStage::{Collected, InCollection};

    let status = &snapshot.status;
    let closed = *status == OrderStatus::Closed;
    let rejected = *status == OrderStatus::Rejected;
    let has_stage = snapshot.execution_stage.is_some();
    let collected = snapshot.stage_is(&Collected);
    let collecting_or_collected = collected || snapshot.stage_is(&InCollection);
    let payment_confirmed = snapshot.payment_confirmed_at.is_some();
    let approved_or_beyond = progress.current >= 1
        || has_stage
        || matches!(
            status,
            OrderStatus::Approved
                | OrderStatus::PendingExecution
                | OrderStatus::InProgress
                | OrderStatus::Completed
                | OrderStatus::Closed
        );

    let created = TimelineStep::new(StepKey::Created, true, *status == OrderStatus::Draft)
        .dated(Some(snapshot.created_at))
        .with_details(Some(format!("Submitted {}", options.format_date(snapshot.created_at))));

    let mut pending = TimelineStep::new(
        StepKey::Pending,
        approved_or_beyond,
        *status == OrderStatus::Pending && !has_stage,
    )
    .dated(snapshot.approved_at.or(approvals.latest_approval_at));
    pending.rejected = rejected;
    pending.details = pending_details(snapshot, approvals, approved_or_beyond, options);

    let pending_execution = TimelineStep::new(
        StepKey::PendingExecution,
        progress.is_completed(1),
        progress.is_current(1) || *status == OrderStatus::PendingExecution,
    )
    .dated(snapshot.execution_start_date)
    .with_details(
        snapshot
            .execution_start_date
            .map(|start| format!("Scheduled start {}", options.format_date(start))),
    );

    let in_progress =
        TimelineStep::new(StepKey::InProgress, progress.is_completed(2), progress.is_current(2))
            .dated(snapshot.execution_start_date)
            .with_details(execution_window(snapshot, options));

    let order_executed = TimelineStep::new(
        StepKey::OrderExecuted,
        progress.is_completed(3),
        progress.is_current(3),
    )
    .dated(snapshot.execution_end_date);

    // Closing an order implies payment was settled even if the timestamp
    // never landed.
    let payment_active = progress.current >= 3 && !payment_confirmed && !closed;
    let awaiting_payment = TimelineStep::new(
        StepKey::AwaitingPayment,
        payment_confirmed || closed,
        payment_active,
    )
    .dated(snapshot.payment_confirmed_at)
    .with_details(match snapshot.payment_confirmed_at {
        Some(confirmed_at) => {
            Some(format!("Payment confirmed {}", options.format_date(confirmed_at)))
        }
        None if payment_active => Some("Waiting for payment confirmation".to_string()),
        None => None,
    });

    let awaiting_collection = TimelineStep::new(
        StepKey::AwaitingCollection,
        progress.is_completed(5) || collecting_or_collected,
        (progress.is_current(3) || progress.is_current(5)) && !collecting_or_collected,
    )
    .dated(stage_updated_at(snapshot, &ExecutionStage::AwaitingCollection));

    let in_collection = TimelineStep::new(
        StepKey::InCollection,
        progress.is_completed(6) || collected || closed,
        progress.is_current(6) && !collected && !closed,
    )
    .dated(stage_updated_at(snapshot, &InCollection));

    let collected_done = collected || progress.is_completed(7) || closed;
    let collected_step = TimelineStep::new(StepKey::Collected, collected_done, false)
        .dated(snapshot.customer_completion_date.filter(|_| collected_done));

    let closed_step = TimelineStep::new(
        StepKey::Closed,
        closed,
        (collected || progress.is_completed(7)) && !closed,
    )
    .dated(snapshot.customer_completion_date.filter(|_| closed));

    let mut steps = [
        created,
        pending,
        pending_execution,
        in_progress,
        order_executed,
        awaiting_payment,
        awaiting_collection,
        in_collection,
        collected_step,
        closed_step,
    ];

    if rejected {
        // A stale execution stage must not light up anything past the
        // rejected approval.
        for step in steps.iter_mut().skip(1) {
            step.completed = false;
            step.active = false;
        }
    }

    keep_first_active(&mut steps);
    steps
}

fn pending_details(
    snapshot: &OrderSnapshot,
    approvals: &ApprovalSummary,
    approved_or_beyond: bool,
    options: &TimelineOptions,
) -> Option<String> {
    if snapshot.status == OrderStatus::Rejected {
        let reason = snapshot
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(options.rejection_fallback.as_str());
        return Some(format!("Rejected: {reason}"));
    }

    if approved_or_beyond {
        return Some(match snapshot.approved_at.or(approvals.latest_approval_at) {
            Some(approved_at) => format!("Approved {}", options.format_date(approved_at)),
            None => "Approved".to_string(),
        });
    }

    if approvals.required_count > 0 {
        return Some(approvals.progress_text());
    }

    Some("Awaiting manager review".to_string())
}

fn execution_window(snapshot: &OrderSnapshot, options: &TimelineOptions) -> Option<String> {
    match (snapshot.execution_start_date, snapshot.execution_end_date) {
        (Some(start), Some(end)) => {
            Some(format!("{} to {}", options.format_date(start), options.format_date(end)))
        }
        (Some(start), None) => Some(format!("Started {}", options.format_date(start))),
        (None, Some(end)) => Some(format!("Until {}", options.format_date(end))),
        (None, None) => None,
    }
}

fn stage_updated_at(snapshot: &OrderSnapshot, stage: &ExecutionStage) -> Option<DateTime<Utc>> {
    snapshot.execution_stage_updated_at.filter(|_| snapshot.stage_is(stage))
}

fn keep_first_active(steps: &mut [TimelineStep]) {
    let mut seen_active = false;
    for step in steps.iter_mut().filter(|step| step.active) {
        if seen_active {
            step.active = false;
        }
        seen_active = true;
    }
}

/// First active step, else first incomplete step, else the last step.
pub fn select_current_step(steps: &[TimelineStep; STEP_COUNT]) -> &TimelineStep {
    steps
        .iter()
        .find(|step| step.active)
        .or_else(|| steps.iter().find(|step| !step.completed))
        .unwrap_or(&steps[STEP_COUNT - 1])
}
