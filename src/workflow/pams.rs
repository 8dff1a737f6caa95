//! PAMS review: a fixed route per category plus a `returned` side branch.
//!
//! ```text
//! faculty: submitted -> hod-confirmed -> dean-confirmed -> vc-approved -> hr-final
//! hod:     submitted ------------------> dean-confirmed -> vc-approved -> hr-final
//!          submitted <-> returned
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::{Actor, TransitionError, clean_comment};
use crate::model::{
    approval::AuditEntry,
    pams::{Assessment, PamsCategory, PamsStatus, PamsSubmission, Workload},
    role::Role,
};

/// How far ahead a review meeting may be scheduled.
pub const MEETING_WINDOW_DAYS: i64 = 365;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PamsAction {
    Confirm,
    Return,
    Resubmit,
}

/// Role whose turn it is, if anyone's.
pub fn reviewer_for(status: PamsStatus, category: PamsCategory) -> Option<Role> {
    match (status, category) {
        (PamsStatus::Submitted, PamsCategory::Faculty) => Some(Role::Hod),
        (PamsStatus::Submitted, PamsCategory::Hod) => Some(Role::Dean),
        (PamsStatus::HodConfirmed, _) => Some(Role::Dean),
        (PamsStatus::DeanConfirmed, _) => Some(Role::Vc),
        (PamsStatus::VcApproved, _) => Some(Role::Hr),
        (PamsStatus::Returned | PamsStatus::HrFinal, _) => None,
    }
}

fn advance(status: PamsStatus, category: PamsCategory) -> Option<PamsStatus> {
    match (status, category) {
        (PamsStatus::Submitted, PamsCategory::Faculty) => Some(PamsStatus::HodConfirmed),
        (PamsStatus::Submitted, PamsCategory::Hod) => Some(PamsStatus::DeanConfirmed),
        (PamsStatus::HodConfirmed, _) => Some(PamsStatus::DeanConfirmed),
        (PamsStatus::DeanConfirmed, _) => Some(PamsStatus::VcApproved),
        (PamsStatus::VcApproved, _) => Some(PamsStatus::HrFinal),
        (PamsStatus::Returned | PamsStatus::HrFinal, _) => None,
    }
}

/// The transition table: `(status, action, role) -> status`.
///
/// Ownership for `resubmit` is checked by the caller, since it depends on
/// who owns the submission rather than on a role.
pub fn next_status(
    status: PamsStatus,
    action: PamsAction,
    role: Role,
    category: PamsCategory,
) -> Result<PamsStatus, TransitionError> {
    match action {
        PamsAction::Resubmit => match status {
            PamsStatus::Returned => Ok(PamsStatus::Submitted),
            _ => Err(TransitionError::not_allowed(status, action)),
        },
        PamsAction::Return | PamsAction::Confirm => {
            let expected =
                reviewer_for(status, category).ok_or_else(|| TransitionError::not_allowed(status, action))?;
            if action == PamsAction::Return && status != PamsStatus::Submitted {
                return Err(TransitionError::not_allowed(status, action));
            }
            if role != expected {
                return Err(TransitionError::NotCurrentStep { role, expected });
            }
            match action {
                PamsAction::Return => Ok(PamsStatus::Returned),
                _ => advance(status, category).ok_or_else(|| TransitionError::not_allowed(status, action)),
            }
        }
    }
}

/// HOD and Dean confirmations must come with a review meeting date.
pub fn requires_meeting(next: PamsStatus) -> bool {
    matches!(next, PamsStatus::HodConfirmed | PamsStatus::DeanConfirmed)
}

pub fn validate_meeting_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, TransitionError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TransitionError::MeetingDate("Meeting date is required".into()))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        TransitionError::MeetingDate(format!(
            "Meeting date `{}` is not a valid date (expected YYYY-MM-DD)",
            raw
        ))
    })?;
    if date < today {
        return Err(TransitionError::MeetingDate("Meeting date cannot be in the past".into()));
    }
    if date > today + Duration::days(MEETING_WINDOW_DAYS) {
        return Err(TransitionError::MeetingDate(format!(
            "Meeting date cannot be more than {} days ahead",
            MEETING_WINDOW_DAYS
        )));
    }
    Ok(date)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PamsReview {
    pub action: PamsAction,
    /// Rubric category -> achievement level.
    #[serde(default)]
    pub levels: BTreeMap<String, String>,
    pub comments: Option<String>,
    #[schema(example = "2026-04-15")]
    pub meeting_date: Option<String>,
}

/// Applies a reviewer's confirm/return.
pub fn review(
    submission: &mut PamsSubmission,
    actor: &Actor,
    review: PamsReview,
    now: DateTime<Utc>,
) -> Result<PamsStatus, TransitionError> {
    if review.action == PamsAction::Resubmit {
        return Err(TransitionError::role_not_permitted(actor.role, "resubmit through review"));
    }
    let next = next_status(submission.status, review.action, actor.role, submission.category)?;
    let comments = clean_comment(review.comments);

    if next == PamsStatus::Returned {
        let comments = comments.ok_or_else(|| TransitionError::CommentRequired("return a submission".into()))?;
        submission.status = next;
        submission.audit.append(AuditEntry::new(
            format!("returned by {}", actor.role.label()),
            actor.name.as_str(),
            now,
            Some(comments),
        ));
        return Ok(next);
    }

    let meeting_date = if requires_meeting(next) {
        Some(validate_meeting_date(review.meeting_date.as_deref(), now.date_naive())?)
    } else {
        None
    };

    submission.assessments.push(Assessment {
        role: actor.role,
        by: actor.name.clone(),
        levels: review.levels,
        comments: comments.clone(),
        meeting_date,
        recorded_at: now,
    });
    submission.status = next;
    submission
        .audit
        .append(AuditEntry::new(next.to_string(), actor.name.as_str(), now, comments));
    Ok(next)
}

/// Owner re-enters a returned submission with a replacement payload.
pub fn resubmit(
    submission: &mut PamsSubmission,
    actor: &Actor,
    workload: Workload,
    rubric: BTreeMap<String, String>,
    now: DateTime<Utc>,
) -> Result<PamsStatus, TransitionError> {
    if !actor.owns(submission.employee_id) {
        return Err(TransitionError::NotOwner("resubmit this appraisal".into()));
    }
    let next = next_status(submission.status, PamsAction::Resubmit, actor.role, submission.category)?;
    submission.workload = workload;
    submission.rubric = rubric;
    submission.status = next;
    submission.resubmissions += 1;
    submission
        .audit
        .append(AuditEntry::new("resubmitted", actor.name.as_str(), now, None));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::approval::AuditTrail;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn submission(category: PamsCategory) -> PamsSubmission {
        PamsSubmission {
            id: 1,
            employee_id: 10,
            period: "2025-2026".into(),
            category,
            workload: Workload {
                teaching: "3 courses".into(),
                research: "2 papers".into(),
                administration: None,
                community: None,
            },
            rubric: BTreeMap::from([("teaching".to_string(), "exceeds".to_string())]),
            status: PamsStatus::Submitted,
            assessments: vec![],
            audit: AuditTrail::default(),
            documents: vec![],
            submitted_at: now(),
            resubmissions: 0,
            version: 0,
        }
    }

    fn confirm(meeting: Option<&str>) -> PamsReview {
        PamsReview {
            action: PamsAction::Confirm,
            levels: BTreeMap::from([("teaching".to_string(), "meets".to_string())]),
            comments: Some("good".into()),
            meeting_date: meeting.map(str::to_string),
        }
    }

    fn actor(role: Role) -> Actor {
        Actor::new(role.label(), role, None)
    }

    #[test]
    fn first_reviewer_depends_on_category() {
        assert_eq!(reviewer_for(PamsStatus::Submitted, PamsCategory::Faculty), Some(Role::Hod));
        assert_eq!(reviewer_for(PamsStatus::Submitted, PamsCategory::Hod), Some(Role::Dean));
        assert_eq!(reviewer_for(PamsStatus::HrFinal, PamsCategory::Faculty), None);
    }

    #[test]
    fn faculty_submission_walks_full_route() {
        let mut sub = submission(PamsCategory::Faculty);
        let steps = [
            (Role::Hod, Some("2026-03-05"), PamsStatus::HodConfirmed),
            (Role::Dean, Some("2026-03-20"), PamsStatus::DeanConfirmed),
            (Role::Vc, None, PamsStatus::VcApproved),
            (Role::Hr, None, PamsStatus::HrFinal),
        ];
        for (role, meeting, expected) in steps {
            assert_eq!(review(&mut sub, &actor(role), confirm(meeting), now()), Ok(expected));
        }
        assert_eq!(sub.assessments.len(), 4);
        let hod = sub.assessments.iter().find(|a| a.role == Role::Hod).unwrap();
        assert_eq!(hod.meeting_date, NaiveDate::from_ymd_opt(2026, 3, 5));
        assert!(sub.assessments.iter().any(|a| a.role == Role::Dean));
        assert_eq!(reviewer_for(sub.status, sub.category), None);
    }

    #[test]
    fn hod_submission_skips_hod_review() {
        let mut sub = submission(PamsCategory::Hod);
        assert!(review(&mut sub, &actor(Role::Hod), confirm(Some("2026-03-05")), now()).is_err());
        assert_eq!(
            review(&mut sub, &actor(Role::Dean), confirm(Some("2026-03-05")), now()),
            Ok(PamsStatus::DeanConfirmed)
        );
    }

    #[test]
    fn hod_confirm_with_past_meeting_is_refused() {
        let mut sub = submission(PamsCategory::Faculty);
        let before = sub.clone();
        let err = review(&mut sub, &actor(Role::Hod), confirm(Some("2026-02-28")), now()).unwrap_err();
        assert!(matches!(err, TransitionError::MeetingDate(_)));
        assert_eq!(sub, before);
        assert_eq!(sub.status, PamsStatus::Submitted);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("15/03/2026"), false)]
    #[case(Some("2026-03-01"), true)]
    #[case(Some("2027-03-01"), true)]
    #[case(Some("2027-03-02"), false)]
    fn meeting_date_window(#[case] raw: Option<&str>, #[case] ok: bool) {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(validate_meeting_date(raw, today).is_ok(), ok);
    }

    #[test]
    fn return_then_resubmit() {
        let mut sub = submission(PamsCategory::Faculty);
        let returned = PamsReview {
            action: PamsAction::Return,
            levels: BTreeMap::new(),
            comments: Some("add research evidence".into()),
            meeting_date: None,
        };
        assert_eq!(review(&mut sub, &actor(Role::Hod), returned, now()), Ok(PamsStatus::Returned));

        let stranger = Actor::new("other", Role::Employee, Some(99));
        let workload = Workload {
            teaching: "3 courses".into(),
            research: "2 papers, 1 grant".into(),
            administration: Some("exam committee".into()),
            community: None,
        };
        assert!(matches!(
            resubmit(&mut sub, &stranger, workload.clone(), BTreeMap::new(), now()),
            Err(TransitionError::NotOwner(_))
        ));

        let owner = Actor::new("owner", Role::Employee, Some(10));
        assert_eq!(
            resubmit(&mut sub, &owner, workload.clone(), BTreeMap::new(), now()),
            Ok(PamsStatus::Submitted)
        );
        assert_eq!(sub.workload, workload);
        assert!(sub.rubric.is_empty());
        assert_eq!(sub.resubmissions, 1);
    }

    #[test]
    fn return_needs_comment_and_submitted_status() {
        let mut sub = submission(PamsCategory::Faculty);
        let silent = PamsReview {
            action: PamsAction::Return,
            levels: BTreeMap::new(),
            comments: None,
            meeting_date: None,
        };
        assert!(matches!(
            review(&mut sub, &actor(Role::Hod), silent.clone(), now()),
            Err(TransitionError::CommentRequired(_))
        ));

        review(&mut sub, &actor(Role::Hod), confirm(Some("2026-03-05")), now()).unwrap();
        let late_return = PamsReview {
            comments: Some("changes".into()),
            ..silent
        };
        assert!(matches!(
            review(&mut sub, &actor(Role::Dean), late_return, now()),
            Err(TransitionError::NotAllowed { .. })
        ));
    }

    #[test]
    fn resubmit_only_from_returned() {
        assert!(next_status(PamsStatus::Submitted, PamsAction::Resubmit, Role::Employee, PamsCategory::Faculty).is_err());
        assert_eq!(
            next_status(PamsStatus::Returned, PamsAction::Resubmit, Role::Employee, PamsCategory::Faculty),
            Ok(PamsStatus::Submitted)
        );
        assert!(next_status(PamsStatus::Returned, PamsAction::Confirm, Role::Hod, PamsCategory::Faculty).is_err());
    }
}
