use crate::domain::order::{ExecutionStage, OrderSnapshot, OrderStatus};
use crate::timeline::steps::StepKey;

pub const REJECTED_BADGE: &str = "Rejected";
pub const CLOSED_BADGE: &str = "Order completed";

/// Row labels for the progress timeline.
pub fn step_label(key: StepKey) -> &'static str {
    match key {
        StepKey::Created => "Order created",
        StepKey::Pending => "Manager approval",
        StepKey::PendingExecution => "Awaiting execution",
        StepKey::InProgress => "Installation in progress",
        StepKey::OrderExecuted => "Order executed",
        StepKey::AwaitingPayment => "Awaiting payment",
        StepKey::AwaitingCollection => "Awaiting collection",
        StepKey::InCollection => "Collection in progress",
        StepKey::Collected => "Collected",
        StepKey::Closed => "Order closed",
    }
}

/// Summary-chip wording per status. Unrecognized statuses show their raw
/// value.
pub fn status_badge_label(status: &OrderStatus) -> &str {
    match status {
        OrderStatus::Draft => "Draft",
        OrderStatus::Pending => "Pending approval",
        OrderStatus::PendingExecution => "Awaiting execution",
        OrderStatus::Approved => "Approved",
        OrderStatus::InProgress => "In progress",
        OrderStatus::Completed => "Completed",
        OrderStatus::Paid => "Paid",
        OrderStatus::AwaitingCollection => "Awaiting collection",
        OrderStatus::InCollection => "In collection",
        OrderStatus::Rejected => REJECTED_BADGE,
        OrderStatus::Closed => "Closed",
        OrderStatus::Unrecognized(raw) => raw,
    }
}

/// Summary-chip wording per execution stage. This table is maintained apart
/// from [`step_label`] and intentionally words several states differently.
pub fn stage_badge_label(stage: &ExecutionStage) -> Option<&'static str> {
    match stage {
        ExecutionStage::Approved => Some("Approved, scheduling"),
        ExecutionStage::PendingExecution => Some("Scheduled for execution"),
        ExecutionStage::Ready => Some("Ready to start"),
        ExecutionStage::InProgress => Some("Scaffolding being installed"),
        ExecutionStage::OrderExecuted => Some("Installation finished"),
        ExecutionStage::AwaitingPayment => Some("Awaiting payment"),
        ExecutionStage::AwaitingCollection => Some("Ready for dismantling"),
        ExecutionStage::InCollection => Some("Dismantling in progress"),
        ExecutionStage::Collected => Some("Scaffolding collected"),
        ExecutionStage::Completed => Some("Order completed"),
        ExecutionStage::Unrecognized(_) => None,
    }
}

pub fn badge_label(snapshot: &OrderSnapshot) -> String {
    match &snapshot.status {
        OrderStatus::Rejected => REJECTED_BADGE.to_string(),
        OrderStatus::Closed => CLOSED_BADGE.to_string(),
        status => {
            let stage_label: Option<&str> =
                snapshot.execution_stage.as_ref().and_then(stage_badge_label);
            stage_label.unwrap_or_else(|| status_badge_label(status)).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{badge_label, stage_badge_label, step_label};
    use crate::domain::order::{ExecutionStage, OrderSnapshot, OrderStatus};
    use crate::timeline::steps::StepKey;

    fn snapshot(status: &str, stage: Option<&str>) -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new(
            OrderStatus::from(status),
            Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
        );
        snapshot.execution_stage = stage.map(ExecutionStage::from);
        snapshot
    }

    #[test]
    fn rejected_and_closed_override_execution_stage() {
        assert_eq!(badge_label(&snapshot("rejected", Some("in_progress"))), "Rejected");
        assert_eq!(badge_label(&snapshot("closed", Some("awaiting_payment"))), "Order completed");
        assert_eq!(badge_label(&snapshot("closed", None)), "Order completed");
    }

    #[test]
    fn execution_stage_label_wins_over_status_label() {
        assert_eq!(
            badge_label(&snapshot("completed", Some("awaiting_payment"))),
            "Awaiting payment"
        );
        assert_eq!(badge_label(&snapshot("completed", None)), "Completed");
    }

    #[test]
    fn unmapped_stage_falls_back_to_status_label() {
        assert_eq!(badge_label(&snapshot("in_progress", Some("on_hold"))), "In progress");
        assert_eq!(badge_label(&snapshot("archived", None)), "archived");
    }

    #[test]
    fn badge_and_step_wording_diverge_for_collection() {
        let badge = stage_badge_label(&ExecutionStage::AwaitingCollection);
        assert_eq!(badge, Some("Ready for dismantling"));
        assert_eq!(step_label(StepKey::AwaitingCollection), "Awaiting collection");
    }
}
