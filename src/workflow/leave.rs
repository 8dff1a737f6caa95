use chrono::{DateTime, NaiveDate, Utc};

use super::{
    Actor, TransitionError,
    chain::{ApprovalChain, ChainOutcome, Decision, decide_chained},
};
use crate::model::leave_request::{LeaveRequest, LeaveType};

pub fn chain_for(leave_type: LeaveType) -> ApprovalChain {
    ApprovalChain::new(leave_type.approval_roles())
}

/// Inclusive calendar days; `None` when the range is inverted.
pub fn leave_days(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    if end < start {
        return None;
    }
    u32::try_from((end - start).num_days() + 1).ok()
}

pub fn review(
    leave: &mut LeaveRequest,
    actor: &Actor,
    decision: Decision,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<ChainOutcome, TransitionError> {
    decide_chained(
        &mut leave.status,
        &mut leave.approval_chain,
        &mut leave.audit,
        actor,
        decision,
        comment,
        at,
    )
}
