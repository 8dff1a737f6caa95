//! Status transitions for every approvable request kind.
//!
//! Functions here mutate a request in place and either succeed completely or
//! return a [`TransitionError`] before touching anything. Callers work on a
//! copy of the stored entity and commit it only on success.

pub mod chain;
pub mod correction;
pub mod leave;
pub mod pams;
pub mod promotion;
pub mod resignation;

use derive_more::Display;

use crate::model::role::Role;

/// The user on whose behalf a transition is attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub role: Role,
    pub employee_id: Option<u64>,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role, employee_id: Option<u64>) -> Self {
        Self {
            name: name.into(),
            role,
            employee_id,
        }
    }

    pub fn owns(&self, employee_id: u64) -> bool {
        self.employee_id == Some(employee_id)
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum TransitionError {
    #[display(fmt = "{} cannot act on this step; it is awaiting {}", role, expected)]
    NotCurrentStep { role: Role, expected: Role },
    #[display(fmt = "The approval chain is already closed")]
    ChainClosed,
    #[display(fmt = "Cannot {} a request that is {}", action, from)]
    NotAllowed { from: String, action: String },
    #[display(fmt = "{}", _0)]
    MeetingDate(String),
    #[display(fmt = "A submission for period {} already exists", period)]
    DuplicateSubmission { period: String },
    #[display(fmt = "An override reason is required")]
    OverrideReasonRequired,
    #[display(fmt = "A comment is required to {}", _0)]
    CommentRequired(String),
    #[display(fmt = "Only the owning employee may {}", _0)]
    NotOwner(String),
    #[display(fmt = "{} is not permitted to {}", role, action)]
    RoleNotPermitted { role: Role, action: String },
}

impl std::error::Error for TransitionError {}

impl TransitionError {
    pub(crate) fn not_allowed(from: impl ToString, action: impl ToString) -> Self {
        TransitionError::NotAllowed {
            from: from.to_string(),
            action: action.to_string(),
        }
    }

    pub(crate) fn role_not_permitted(role: Role, action: impl Into<String>) -> Self {
        TransitionError::RoleNotPermitted {
            role,
            action: action.into(),
        }
    }
}

/// Trims a free-text comment, treating blank input as absent.
pub(crate) fn clean_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
