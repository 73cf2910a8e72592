use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::ApprovalRecord;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub all_approved: bool,
    /// Only populated once every approver has signed off.
    pub latest_approval_at: Option<DateTime<Utc>>,
    pub approved_count: usize,
    pub required_count: usize,
}

impl ApprovalSummary {
    pub fn progress_text(&self) -> String {
        format!("{} of {} approvers confirmed", self.approved_count, self.required_count)
    }
}

/// An empty approval list is "not approved", never trivially approved.
pub fn aggregate_approvals(approvals: &[ApprovalRecord]) -> ApprovalSummary {
    let required_count = approvals.len();
    let approved_count = approvals.iter().filter(|record| record.is_approved()).count();
    let all_approved = required_count > 0 && approved_count == required_count;

    let latest_approval_at = if all_approved {
        approvals.iter().filter_map(|record| record.approved_at).max()
    } else {
        None
    };

    ApprovalSummary { all_approved, latest_approval_at, approved_count, required_count }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::aggregate_approvals;
    use crate::domain::order::ApprovalRecord;

    fn approved(role: &str, day: u32) -> ApprovalRecord {
        ApprovalRecord {
            approver_role: role.to_string(),
            approved_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
            approver_user_id: Some(format!("user-{role}")),
        }
    }

    #[test]
    fn empty_approvals_are_not_approved() {
        let summary = aggregate_approvals(&[]);
        assert!(!summary.all_approved);
        assert_eq!(summary.latest_approval_at, None);
        assert_eq!(summary.required_count, 0);
    }

    #[test]
    fn partial_approvals_are_not_approved() {
        let summary =
            aggregate_approvals(&[approved("ceo", 3), ApprovalRecord::requested("finance")]);

        assert!(!summary.all_approved);
        assert_eq!(summary.latest_approval_at, None);
        assert_eq!(summary.progress_text(), "1 of 2 approvers confirmed");
    }

    #[test]
    fn latest_approval_is_the_maximum_timestamp() {
        let summary =
            aggregate_approvals(&[approved("ceo", 9), approved("finance", 4), approved("ops", 7)]);

        assert!(summary.all_approved);
        assert_eq!(
            summary.latest_approval_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 9, 12, 0, 0).unwrap())
        );
    }
}
