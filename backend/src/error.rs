//! Error types for the draw progression engine
//!
//! Every public operation returns `Result<_, DrawError>`. Errors are plain
//! values so an outcome can be tried speculatively ("would this be legal?")
//! without unwinding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by draw operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("Missing draw definition")]
    MissingDrawDefinition,

    #[error("Missing matchUpId")]
    MissingMatchUpId,

    #[error("MatchUp not found: {0}")]
    MatchUpNotFound(String),

    #[error("Invalid values: {0}")]
    InvalidValues(String),

    #[error("Incompatible matchUp status: {0}")]
    IncompatibleMatchUpStatus(String),

    #[error("Unlinked structures: {0}")]
    UnlinkedStructures(String),
}

/// Stable error codes used on the outbound surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingDrawDefinition,
    #[serde(rename = "MISSING_MATCHUP_ID")]
    MissingMatchUpId,
    #[serde(rename = "MATCHUP_NOT_FOUND")]
    MatchUpNotFound,
    InvalidValues,
    #[serde(rename = "INCOMPATIBLE_MATCHUP_STATUS")]
    IncompatibleMatchUpStatus,
    UnlinkedStructures,
}

/// Outbound error payload: `{ "error": "...", "context": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl DrawError {
    /// Error code for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DrawError::MissingDrawDefinition => ErrorKind::MissingDrawDefinition,
            DrawError::MissingMatchUpId => ErrorKind::MissingMatchUpId,
            DrawError::MatchUpNotFound(_) => ErrorKind::MatchUpNotFound,
            DrawError::InvalidValues(_) => ErrorKind::InvalidValues,
            DrawError::IncompatibleMatchUpStatus(_) => ErrorKind::IncompatibleMatchUpStatus,
            DrawError::UnlinkedStructures(_) => ErrorKind::UnlinkedStructures,
        }
    }

    /// Context string carried by the error, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            DrawError::MissingDrawDefinition | DrawError::MissingMatchUpId => None,
            DrawError::MatchUpNotFound(ctx)
            | DrawError::InvalidValues(ctx)
            | DrawError::IncompatibleMatchUpStatus(ctx)
            | DrawError::UnlinkedStructures(ctx) => Some(ctx),
        }
    }

    /// Convert into the outbound `{ error, context }` payload
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind(),
            context: self.context().map(str::to_string),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DrawError::InvalidValues(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        DrawError::IncompatibleMatchUpStatus(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_codes() {
        let err = DrawError::MatchUpNotFound("m1".to_string());
        let response = err.to_response();
        assert_eq!(response.error, ErrorKind::MatchUpNotFound);
        assert_eq!(response.context.as_deref(), Some("m1"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "MATCHUP_NOT_FOUND");
    }

    #[test]
    fn test_missing_draw_has_no_context() {
        let response = DrawError::MissingDrawDefinition.to_response();
        assert_eq!(response.context, None);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"MISSING_DRAW_DEFINITION"}"#);
    }
}
