use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::eligibility::Ineligible;
use crate::workflow::TransitionError;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum HrError {
    /// Input failed a required/format rule.
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Ineligible(Ineligible),
    #[display(fmt = "{}", _0)]
    InvalidTransition(TransitionError),
    #[display(fmt = "{} {} not found", kind, id)]
    NotFound { kind: &'static str, id: u64 },
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "Internal error: {}", _0)]
    Internal(String),
}

impl std::error::Error for HrError {}

impl HrError {
    pub fn validation(message: impl Into<String>) -> Self {
        HrError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HrError::Forbidden(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HrError::Validation(_) => "validation",
            HrError::Ineligible(_) => "ineligible",
            HrError::InvalidTransition(_) => "invalid_transition",
            HrError::NotFound { .. } => "not_found",
            HrError::Forbidden(_) => "forbidden",
            HrError::Conflict(_) => "conflict",
            HrError::Internal(_) => "internal",
        }
    }
}

impl From<Ineligible> for HrError {
    fn from(reason: Ineligible) -> Self {
        HrError::Ineligible(reason)
    }
}

impl From<TransitionError> for HrError {
    fn from(err: TransitionError) -> Self {
        HrError::InvalidTransition(err)
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::Validation(_) => StatusCode::BAD_REQUEST,
            HrError::Ineligible(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HrError::InvalidTransition(_) | HrError::Conflict(_) => StatusCode::CONFLICT,
            HrError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrError::Forbidden(_) => StatusCode::FORBIDDEN,
            HrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let HrError::Internal(details) = self {
            tracing::error!(error = %details, "Internal error");
            return HttpResponse::InternalServerError().json(json!({
                "error": self.kind(),
                "message": "Internal Server Error",
            }));
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(HrError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HrError::from(Ineligible::NotFemale).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            HrError::from(TransitionError::ChainClosed).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HrError::NotFound { kind: "Leave request", id: 3 }.to_string(),
            "Leave request 3 not found"
        );
    }

    #[test]
    fn transition_message_names_roles() {
        let err = HrError::from(TransitionError::NotCurrentStep {
            role: Role::Dean,
            expected: Role::Hod,
        });
        assert_eq!(err.to_string(), "dean cannot act on this step; it is awaiting hod");
        assert_eq!(err.kind(), "invalid_transition");
    }
}
