use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failure reported by a data gateway backend.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    #[display(fmt = "data service unreachable: {}", _0)]
    Network(String),
    #[display(fmt = "data service rejected credentials: {}", _0)]
    Auth(String),
    #[display(fmt = "constraint violated: {}", _0)]
    Constraint(String),
    #[display(fmt = "unexpected row shape: {}", _0)]
    Decode(String),
    #[display(fmt = "invalid query: {}", _0)]
    InvalidQuery(String),
}

impl std::error::Error for DataAccessError {}

impl From<serde_json::Error> for DataAccessError {
    fn from(e: serde_json::Error) -> Self {
        DataAccessError::Decode(e.to_string())
    }
}

/// Failure of a state-changing action issued from a view.
#[derive(Debug, Display)]
pub enum ActionError {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "No active check-in found for today")]
    NotCheckedIn,
    #[display(fmt = "Task not found")]
    TaskNotFound,
    #[display(fmt = "Unknown task status: {}", _0)]
    InvalidTransition(String),
    #[display(fmt = "{}", _0)]
    Data(DataAccessError),
}

impl std::error::Error for ActionError {}

impl From<DataAccessError> for ActionError {
    fn from(e: DataAccessError) -> Self {
        ActionError::Data(e)
    }
}

impl ResponseError for ActionError {
    fn status_code(&self) -> StatusCode {
        match self {
            ActionError::AlreadyCheckedIn | ActionError::NotCheckedIn => StatusCode::CONFLICT,
            ActionError::TaskNotFound => StatusCode::NOT_FOUND,
            ActionError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::Data(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_check_in_is_a_conflict() {
        let err = ActionError::AlreadyCheckedIn;
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Already checked in today");
    }

    #[test]
    fn network_failures_surface_as_bad_gateway() {
        let err: ActionError = DataAccessError::Network("timed out".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "data service unreachable: timed out");
    }
}
