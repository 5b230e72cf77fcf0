use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("could not reach the API: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{reason}")]
    Application { status: Option<u16>, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error("{resource} do not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    ConfirmationRequired(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// A failure recorded by a controller, raised again as-is
    #[error("{}", .0.reason)]
    Reported(Failure),
}

impl DeskError {
    /// Which branch of the failure taxonomy this error belongs to
    pub fn kind(&self) -> FailureKind {
        match self {
            DeskError::Transport(_) | DeskError::Timeout(_) => FailureKind::Transport,
            DeskError::Application { .. } => FailureKind::Application,
            DeskError::Validation(_)
            | DeskError::Unsupported { .. }
            | DeskError::ConfirmationRequired(_) => FailureKind::Validation,
            DeskError::Config(_)
            | DeskError::Io(_)
            | DeskError::Json(_)
            | DeskError::YamlParse(_)
            | DeskError::Csv(_)
            | DeskError::Xlsx(_) => FailureKind::Local,
            DeskError::Reported(failure) => failure.kind,
        }
    }

    /// Snapshot the error as a cloneable failure value for controller state
    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            reason: self.to_string(),
        }
    }

    pub fn application(reason: impl Into<String>) -> Self {
        DeskError::Application {
            status: None,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return DeskError::Transport(format!("request timed out: {err}"));
        }
        if err.is_decode() {
            return DeskError::Application {
                status: err.status().map(|s| s.as_u16()),
                reason: format!("unexpected response from server: {err}"),
            };
        }
        if let Some(status) = err.status() {
            return DeskError::Application {
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
        }
        DeskError::Transport(err.to_string())
    }
}

impl From<Failure> for DeskError {
    fn from(failure: Failure) -> Self {
        DeskError::Reported(failure)
    }
}

/// Coarse classification of a failed action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response was received
    Transport,
    /// The server answered with an error reason
    Application,
    /// Rejected before any request was issued
    Validation,
    /// Local I/O, configuration or encoding problem
    Local,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Application => write!(f, "application"),
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::Local => write!(f, "local"),
        }
    }
}

/// A classified failure with a human readable reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DeskError::Transport("refused".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(DeskError::Timeout(30).kind(), FailureKind::Transport);
        assert_eq!(
            DeskError::application("IMO already registered").kind(),
            FailureKind::Application
        );
        assert_eq!(
            DeskError::Validation("start date is required".into()).kind(),
            FailureKind::Validation
        );
        assert_eq!(
            DeskError::Unsupported {
                resource: "certificates",
                operation: "search"
            }
            .kind(),
            FailureKind::Validation
        );
    }

    #[test]
    fn test_application_reason_is_verbatim() {
        let failure = DeskError::application("IMO already registered").to_failure();
        assert_eq!(failure.kind, FailureKind::Application);
        assert_eq!(failure.reason, "IMO already registered");
    }

    #[test]
    fn test_unsupported_message() {
        let err = DeskError::Unsupported {
            resource: "certificates",
            operation: "delete",
        };
        assert_eq!(err.to_string(), "certificates do not support delete");
    }

    #[test]
    fn test_reported_failure_keeps_kind_and_reason() {
        let failure = DeskError::Transport("connection refused".into()).to_failure();
        let err = DeskError::from(failure.clone());
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.to_string(), failure.reason);
    }
}
