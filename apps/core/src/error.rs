use serde::Serialize;
use thiserror::Error;

/// Errors raised by an external collaborator (risk, rumor validation, guidance, resource).
///
/// These never abort a workflow: each stage converts them into its fallback payload.
#[derive(Debug, Error, Serialize, Clone, PartialEq)]
pub enum ProviderError {
    /// The collaborator ran and reported a failure.
    #[error("Provider request failed: {0}")]
    Failed(String),
    /// The collaborator did not answer within the stage timeout.
    #[error("Provider timed out: {0}")]
    Timeout(String),
    /// The collaborator answered with something that could not be interpreted.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<tokio::time::error::Elapsed> for ProviderError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ProviderError::Timeout(format!("Stage deadline exceeded: {}", err))
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(format!("JSON error: {}", err))
    }
}

/// Application-wide error type, consolidating all fatal errors into a single enum.
#[derive(Debug, Error, Clone)]
pub enum AppError {
    /// Configuration problems: a missing collaborator at initialization or unusable settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure inside the orchestration glue itself, outside any stage boundary.
    #[error("Orchestration error: {0}")]
    Orchestration(String),

    /// A collaborator failure surfaced to a caller instead of being absorbed by a stage.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Communication failure with the workflow actor (closed channel, dropped responder).
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(format!("Operation timed out: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("Invalid pattern: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_converts_into_app_error() {
        let err: AppError = ProviderError::Failed("upstream down".to_string()).into();
        assert!(matches!(err, AppError::Provider(ProviderError::Failed(_))));
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_regex_error_is_configuration_error() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: AppError = regex_err.into();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_json_error_is_invalid_provider_response() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ProviderError = json_err.into();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
