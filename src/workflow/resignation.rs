use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{Actor, TransitionError, clean_comment};
use crate::model::{
    approval::AuditEntry,
    resignation::{ExitSurvey, HandoverStatus, Resignation, ResignationStatus},
};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResignationAction {
    Approve,
    Reject,
    Withdraw,
    Complete,
}

pub fn next_status(status: ResignationStatus, action: ResignationAction) -> Option<ResignationStatus> {
    use ResignationAction as A;
    use ResignationStatus as S;
    match (status, action) {
        (S::Pending, A::Approve) => Some(S::Approved),
        (S::Pending, A::Reject) => Some(S::Rejected),
        (S::Pending, A::Withdraw) => Some(S::Withdrawn),
        (S::Approved, A::Complete) => Some(S::Completed),
        _ => None,
    }
}

pub fn apply(
    resignation: &mut Resignation,
    actor: &Actor,
    action: ResignationAction,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<ResignationStatus, TransitionError> {
    match action {
        ResignationAction::Withdraw => {
            if !actor.owns(resignation.employee_id) {
                return Err(TransitionError::NotOwner("withdraw this resignation".into()));
            }
        }
        _ => {
            if !actor.role.is_hr_or_admin() {
                return Err(TransitionError::role_not_permitted(
                    actor.role,
                    format!("{} a resignation", action),
                ));
            }
        }
    }

    let next = next_status(resignation.status, action)
        .ok_or_else(|| TransitionError::not_allowed(resignation.status, action))?;

    if next == ResignationStatus::Completed && resignation.handover_status != HandoverStatus::Completed {
        tracing::warn!(
            resignation_id = resignation.id,
            employee_id = resignation.employee_id,
            handover = %resignation.handover_status,
            "Completing resignation with handover not finished"
        );
    }

    resignation.status = next;
    resignation.audit.append(AuditEntry::new(
        next.to_string(),
        actor.name.as_str(),
        at,
        clean_comment(comment),
    ));
    Ok(next)
}

pub fn attach_exit_survey(
    resignation: &mut Resignation,
    actor: &Actor,
    mut survey: ExitSurvey,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    if !actor.owns(resignation.employee_id) {
        return Err(TransitionError::NotOwner("submit the exit survey".into()));
    }
    if !matches!(
        resignation.status,
        ResignationStatus::Approved | ResignationStatus::Completed
    ) {
        return Err(TransitionError::not_allowed(resignation.status, "attach an exit survey to"));
    }
    survey.submitted_at = at;
    resignation.exit_survey = Some(survey);
    resignation
        .audit
        .append(AuditEntry::new("exit survey submitted", actor.name.as_str(), at, None));
    Ok(())
}

/// Audit entry for a handover update; the status field itself is patched by the caller.
pub fn handover_entry(
    resignation: &Resignation,
    actor: &Actor,
    handover: HandoverStatus,
    at: DateTime<Utc>,
) -> Result<AuditEntry, TransitionError> {
    if !(actor.role.is_hr_or_admin() || actor.role == crate::model::role::Role::Hod) {
        return Err(TransitionError::role_not_permitted(actor.role, "update handover status"));
    }
    if !resignation.status.is_open() {
        return Err(TransitionError::not_allowed(resignation.status, "update handover on"));
    }
    Ok(AuditEntry::new(format!("handover {}", handover), actor.name.as_str(), at, None))
}
