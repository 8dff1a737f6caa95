use chrono::{DateTime, Utc};

use super::{
    Actor, TransitionError,
    chain::{ApprovalChain, ChainOutcome, Decision, decide_chained},
};
use crate::model::{promotion::PromotionRequest, role::Role};

pub const PROMOTION_ROLES: [Role; 3] = [Role::Hod, Role::Dean, Role::Hr];

pub fn chain() -> ApprovalChain {
    ApprovalChain::new(&PROMOTION_ROLES)
}

pub fn review(
    request: &mut PromotionRequest,
    actor: &Actor,
    decision: Decision,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<ChainOutcome, TransitionError> {
    decide_chained(
        &mut request.status,
        &mut request.approval_chain,
        &mut request.audit,
        actor,
        decision,
        comment,
        at,
    )
}
