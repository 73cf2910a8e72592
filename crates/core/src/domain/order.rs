use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Coarse lifecycle status as stored on the order record.
///
/// Values the backend introduces later are kept verbatim in `Unrecognized`
/// so a snapshot always deserializes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Draft,
    Pending,
    PendingExecution,
    Approved,
    InProgress,
    Completed,
    Paid,
    AwaitingCollection,
    InCollection,
    Rejected,
    Closed,
    Unrecognized(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::PendingExecution => "pending_execution",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Paid => "paid",
            Self::AwaitingCollection => "awaiting_collection",
            Self::InCollection => "in_collection",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Draft, Pending)
                | (Pending, Approved)
                | (Pending, PendingExecution)
                | (Pending, Rejected)
                | (Approved, PendingExecution)
                | (Approved, InProgress)
                | (PendingExecution, InProgress)
                | (InProgress, Completed)
                | (Completed, Paid)
                | (Completed, AwaitingCollection)
                | (Completed, Closed)
                | (Paid, AwaitingCollection)
                | (Paid, Closed)
                | (AwaitingCollection, InCollection)
                | (InCollection, Closed)
                | (Rejected, Pending)
        )
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "pending_execution" => Self::PendingExecution,
            "approved" => Self::Approved,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "paid" => Self::Paid,
            "awaiting_collection" => Self::AwaitingCollection,
            "in_collection" => Self::InCollection,
            "rejected" => Self::Rejected,
            "closed" => Self::Closed,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained sub-state, updated more often than [`OrderStatus`] while the
/// scaffolding is on site.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStage {
    Approved,
    PendingExecution,
    Ready,
    InProgress,
    OrderExecuted,
    AwaitingPayment,
    AwaitingCollection,
    InCollection,
    Collected,
    Completed,
    Unrecognized(String),
}

impl ExecutionStage {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::PendingExecution => "pending_execution",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::OrderExecuted => "order_executed",
            Self::AwaitingPayment => "awaiting_payment",
            Self::AwaitingCollection => "awaiting_collection",
            Self::InCollection => "in_collection",
            Self::Collected => "collected",
            Self::Completed => "completed",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for ExecutionStage {
    fn from(value: &str) -> Self {
        match value.trim() {
            "approved" => Self::Approved,
            "pending_execution" => Self::PendingExecution,
            "ready" => Self::Ready,
            "in_progress" => Self::InProgress,
            "order_executed" => Self::OrderExecuted,
            "awaiting_payment" => Self::AwaitingPayment,
            "awaiting_collection" => Self::AwaitingCollection,
            "in_collection" => Self::InCollection,
            "collected" => Self::Collected,
            "completed" => Self::Completed,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for ExecutionStage {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ExecutionStage> for String {
    fn from(value: ExecutionStage) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    #[serde(alias = "approverRole")]
    pub approver_role: String,
    #[serde(default, alias = "approvedAt")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "approverUserId")]
    pub approver_user_id: Option<String>,
}

impl ApprovalRecord {
    pub fn requested(approver_role: impl Into<String>) -> Self {
        Self { approver_role: approver_role.into(), approved_at: None, approver_user_id: None }
    }

    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }
}

/// Read-only view of an order record as fetched from the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    #[serde(default)]
    pub id: Option<OrderId>,
    pub status: OrderStatus,
    #[serde(default, alias = "executionStage", deserialize_with = "deserialize_stage")]
    pub execution_stage: Option<ExecutionStage>,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "approvedAt")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "executionStartDate")]
    pub execution_start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "executionEndDate")]
    pub execution_end_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "executionStageUpdatedAt")]
    pub execution_stage_updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "paymentConfirmedAt")]
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "customerCompletionDate")]
    pub customer_completion_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "rejectionReason")]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub approvals: Vec<ApprovalRecord>,
}

impl OrderSnapshot {
    pub fn new(status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            status,
            execution_stage: None,
            created_at,
            approved_at: None,
            execution_start_date: None,
            execution_end_date: None,
            execution_stage_updated_at: None,
            payment_confirmed_at: None,
            customer_completion_date: None,
            rejection_reason: None,
            approvals: Vec::new(),
        }
    }

    pub fn with_approvals(mut self, approvals: Vec<ApprovalRecord>) -> Self {
        self.approvals = approvals;
        self
    }

    pub fn stage_is(&self, stage: &ExecutionStage) -> bool {
        self.execution_stage.as_ref() == Some(stage)
    }
}

/// A blank stage string means no stage was set.
fn deserialize_stage<'de, D>(deserializer: D) -> Result<Option<ExecutionStage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()).map(ExecutionStage::from))
}

/// Status guard for the coarse lifecycle; the backend applies the update,
/// this only decides whether it is a legal move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderLifecycle {
    pub status: OrderStatus,
}

impl OrderLifecycle {
    pub fn new(status: OrderStatus) -> Self {
        Self { status }
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(&next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidOrderTransition { from: self.status.clone(), to: next })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{ExecutionStage, OrderLifecycle, OrderSnapshot, OrderStatus};
    use crate::errors::DomainError;

    #[test]
    fn allows_valid_lifecycle_transition() {
        let mut lifecycle = OrderLifecycle::new(OrderStatus::Draft);
        lifecycle.transition_to(OrderStatus::Pending).expect("draft->pending");
        lifecycle.transition_to(OrderStatus::Approved).expect("pending->approved");
        lifecycle.transition_to(OrderStatus::InProgress).expect("approved->in_progress");
        assert_eq!(lifecycle.status, OrderStatus::InProgress);
    }

    #[test]
    fn lifecycle_table_allows_exactly_the_listed_moves() {
        use OrderStatus::*;

        let allowed = [
            (Draft, Pending),
            (Pending, Approved),
            (Pending, PendingExecution),
            (Pending, Rejected),
            (Approved, PendingExecution),
            (Approved, InProgress),
            (PendingExecution, InProgress),
            (InProgress, Completed),
            (Completed, Paid),
            (Completed, AwaitingCollection),
            (Completed, Closed),
            (Paid, AwaitingCollection),
            (Paid, Closed),
            (AwaitingCollection, InCollection),
            (InCollection, Closed),
            (Rejected, Pending),
        ];
        let statuses = [
            Draft,
            Pending,
            PendingExecution,
            Approved,
            InProgress,
            Completed,
            Paid,
            AwaitingCollection,
            InCollection,
            Rejected,
            Closed,
        ];

        for from in &statuses {
            for to in &statuses {
                let expected = allowed.iter().any(|(a, b)| a == from && b == to);
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to} should be {}",
                    if expected { "allowed" } else { "blocked" }
                );
            }
        }

        assert!(!InProgress.can_transition_to(&Rejected));
        assert!(!Approved.can_transition_to(&Rejected));
    }

    #[test]
    fn blocks_invalid_lifecycle_transition() {
        let mut lifecycle = OrderLifecycle::new(OrderStatus::Draft);
        let error =
            lifecycle.transition_to(OrderStatus::Closed).expect_err("draft->closed should fail");
        assert!(matches!(error, DomainError::InvalidOrderTransition { .. }));
        assert_eq!(lifecycle.status, OrderStatus::Draft);
    }

    #[test]
    fn closed_orders_are_terminal() {
        let closed = OrderStatus::Closed;
        assert!(closed.is_terminal());
        assert!(!closed.can_transition_to(&OrderStatus::Pending));
        assert!(!closed.can_transition_to(&OrderStatus::Rejected));
    }

    #[test]
    fn rejected_orders_can_be_resubmitted() {
        let mut lifecycle = OrderLifecycle::new(OrderStatus::Pending);
        lifecycle.transition_to(OrderStatus::Rejected).expect("pending -> rejected");
        lifecycle.transition_to(OrderStatus::Pending).expect("rejected -> pending");
        assert_eq!(lifecycle.status, OrderStatus::Pending);
    }

    #[test]
    fn unrecognized_status_neither_leaves_nor_enters() {
        let legacy = OrderStatus::from("archived");
        assert!(!legacy.can_transition_to(&OrderStatus::Closed));
        assert!(!OrderStatus::Pending.can_transition_to(&legacy));
    }

    #[test]
    fn unknown_enum_strings_survive_deserialization() {
        let snapshot: OrderSnapshot = serde_json::from_str(
            r#"{"status":"archived","execution_stage":"on_hold","created_at":"2024-03-01T08:00:00Z"}"#,
        )
        .expect("snapshot with unknown values should parse");

        assert_eq!(snapshot.status, OrderStatus::Unrecognized("archived".to_string()));
        assert_eq!(
            snapshot.execution_stage,
            Some(ExecutionStage::Unrecognized("on_hold".to_string()))
        );
        assert!(snapshot.approvals.is_empty());
    }

    #[test]
    fn blank_execution_stage_is_absent() {
        for raw in ["\"\"", "\"   \"", "null"] {
            let snapshot: OrderSnapshot = serde_json::from_str(&format!(
                r#"{{"status":"pending","execution_stage":{raw},"created_at":"2024-03-01T08:00:00Z"}}"#
            ))
            .expect("snapshot with blank stage should parse");
            assert_eq!(snapshot.execution_stage, None, "stage {raw} should be absent");
        }
    }

    #[test]
    fn camel_case_fields_are_accepted() {
        let snapshot: OrderSnapshot = serde_json::from_str(
            r#"{
                "status": "in_progress",
                "executionStage": "in_progress",
                "createdAt": "2024-03-01T08:00:00Z",
                "paymentConfirmedAt": null,
                "approvals": [{"approverRole": "ceo", "approvedAt": "2024-03-02T09:30:00Z"}]
            }"#,
        )
        .expect("camelCase snapshot should parse");

        assert_eq!(snapshot.execution_stage, Some(ExecutionStage::InProgress));
        assert_eq!(snapshot.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
        assert_eq!(snapshot.approvals.len(), 1);
        assert!(snapshot.approvals[0].is_approved());
        assert_eq!(snapshot.approvals[0].approver_user_id, None);
    }

    #[test]
    fn statuses_serialize_as_wire_strings() {
        let encoded = serde_json::to_string(&OrderStatus::PendingExecution).expect("serialize");
        assert_eq!(encoded, "\"pending_execution\"");

        let encoded =
            serde_json::to_string(&ExecutionStage::Unrecognized("on_hold".to_string()))
                .expect("serialize");
        assert_eq!(encoded, "\"on_hold\"");
    }
}
