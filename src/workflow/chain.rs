use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{Actor, TransitionError, clean_comment};
use crate::model::{
    approval::{AuditEntry, AuditTrail, RequestStatus},
    role::Role,
};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApprovalStep {
    pub role: Role,
    pub status: StepStatus,
    pub by: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    /// The step was approved and the chain now waits on `next`.
    Advanced { next: Role },
    Approved,
    Rejected,
}

/// Ordered, role-gated review steps. Only the first pending step can be
/// decided, and a rejection closes the chain for good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApprovalChain(Vec<ApprovalStep>);

impl ApprovalChain {
    pub fn new(roles: &[Role]) -> Self {
        ApprovalChain(
            roles
                .iter()
                .map(|role| ApprovalStep {
                    role: *role,
                    status: StepStatus::Pending,
                    by: None,
                    date: None,
                    comment: None,
                })
                .collect(),
        )
    }

    #[cfg(test)]
    pub fn steps(&self) -> &[ApprovalStep] {
        &self.0
    }

    pub fn is_rejected(&self) -> bool {
        self.0.iter().any(|s| s.status == StepStatus::Rejected)
    }

    pub fn is_approved(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|s| s.status == StepStatus::Approved)
    }

    /// Index of the step currently waiting for a decision.
    pub fn current_step(&self) -> Option<usize> {
        if self.is_rejected() {
            return None;
        }
        self.0.iter().position(|s| s.status == StepStatus::Pending)
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current_step().map(|i| self.0[i].role)
    }

    pub fn decide(
        &mut self,
        role: Role,
        decision: Decision,
        by: &str,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ChainOutcome, TransitionError> {
        let index = self.current_step().ok_or(TransitionError::ChainClosed)?;
        let step = &mut self.0[index];
        if step.role != role {
            return Err(TransitionError::NotCurrentStep {
                role,
                expected: step.role,
            });
        }

        step.status = match decision {
            Decision::Approve => StepStatus::Approved,
            Decision::Reject => StepStatus::Rejected,
        };
        step.by = Some(by.to_string());
        step.date = Some(at);
        step.comment = comment;

        Ok(match decision {
            Decision::Reject => ChainOutcome::Rejected,
            Decision::Approve => match self.current_role() {
                Some(next) => ChainOutcome::Advanced { next },
                None => ChainOutcome::Approved,
            },
        })
    }
}

/// Applies a reviewer decision to a chained request and keeps its overall
/// status in step with the chain.
pub fn decide_chained(
    status: &mut RequestStatus,
    chain: &mut ApprovalChain,
    audit: &mut AuditTrail,
    actor: &Actor,
    decision: Decision,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<ChainOutcome, TransitionError> {
    if *status != RequestStatus::Pending {
        return Err(TransitionError::not_allowed(*status, decision));
    }
    let comment = clean_comment(comment);
    let outcome = chain.decide(actor.role, decision, &actor.name, comment.clone(), at)?;

    *status = if chain.is_rejected() {
        RequestStatus::Rejected
    } else if chain.is_approved() {
        RequestStatus::Approved
    } else {
        RequestStatus::Pending
    };
    audit.append(AuditEntry::new(
        format!("{} by {}", decision.past_tense(), actor.role.label()),
        actor.name.as_str(),
        at,
        comment,
    ));
    Ok(outcome)
}

/// Single-step decision for requests without a chain.
pub fn decide_single(
    status: &mut RequestStatus,
    audit: &mut AuditTrail,
    actor: &Actor,
    decision: Decision,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<RequestStatus, TransitionError> {
    if *status != RequestStatus::Pending {
        return Err(TransitionError::not_allowed(*status, decision));
    }
    *status = match decision {
        Decision::Approve => RequestStatus::Approved,
        Decision::Reject => RequestStatus::Rejected,
    };
    audit.append(AuditEntry::new(
        format!("{} by {}", decision.past_tense(), actor.role.label()),
        actor.name.as_str(),
        at,
        clean_comment(comment),
    ));
    Ok(*status)
}
