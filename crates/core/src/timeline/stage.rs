use serde::{Deserialize, Serialize};

use crate::domain::order::{ExecutionStage, OrderStatus};

pub const CLOSED_STAGE: u8 = 9;

/// Shared rank table for status and execution-stage values; higher is
/// further along.
pub fn stage_rank(key: &str) -> Option<u8> {
    match key {
        "approved" | "pending_execution" | "ready" => Some(1),
        "in_progress" => Some(2),
        "order_executed" => Some(3),
        "awaiting_payment" => Some(4),
        "awaiting_collection" => Some(5),
        "in_collection" => Some(6),
        "collected" => Some(7),
        "completed" => Some(8),
        "closed" => Some(CLOSED_STAGE),
        _ => None,
    }
}

pub fn current_stage_number(status: &OrderStatus, execution_stage: Option<&ExecutionStage>) -> u8 {
    // Some legacy orders close without ever recording a terminal stage.
    if *status == OrderStatus::Closed {
        return CLOSED_STAGE;
    }

    let status_rank = stage_rank(status.as_str());
    match execution_stage {
        Some(stage) => stage_rank(stage.as_str()).or(status_rank).unwrap_or(0),
        None => status_rank.unwrap_or(0),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub current: u8,
}

impl StageProgress {
    pub fn resolve(status: &OrderStatus, execution_stage: Option<&ExecutionStage>) -> Self {
        Self { current: current_stage_number(status, execution_stage) }
    }

    pub fn is_completed(&self, stage: u8) -> bool {
        self.current > stage
    }

    pub fn is_current(&self, stage: u8) -> bool {
        self.current == stage
    }
}
