use serde::Serialize;
use thiserror::Error;

/// Wire name of a failure category, emitted as `error_kind` in every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    DependencyMissing,
    #[serde(rename = "InvalidURL")]
    InvalidUrl,
    HttpStatus,
    Timeout,
    Interrupted,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkillError {
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{message}")]
    DependencyMissing { dependency: String, message: String },

    #[error("URL must start with http:// or https://")]
    InvalidUrl { url: String },

    #[error("HTTP error {code}: {reason}")]
    HttpStatus { code: u16, reason: String },

    #[error("Request timed out ({seconds} seconds)")]
    Timeout { seconds: u64 },

    #[error("Operation cancelled by user")]
    Interrupted,

    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

impl SkillError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn dependency_missing(dependency: &str, hint: &str) -> Self {
        Self::DependencyMissing {
            dependency: dependency.to_string(),
            message: format!("{} support not available. {}", dependency, hint),
        }
    }

    pub fn invalid_url(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
        }
    }

    pub fn http_status(code: u16, reason: &str) -> Self {
        Self::HttpStatus {
            code,
            reason: reason.to_string(),
        }
    }

    pub fn other(kind: &str, message: impl ToString) -> Self {
        Self::Other {
            kind: kind.to_string(),
            message: message.to_string(),
        }
    }

    /// Failure while decoding a provider payload (JSON, Atom, HTML).
    pub fn parse(format: &str, source: impl std::fmt::Display) -> Self {
        Self::other("ParseError", format!("invalid {} payload: {}", format, source))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SkillError::InvalidInput { .. } => ErrorKind::InvalidInput,
            SkillError::DependencyMissing { .. } => ErrorKind::DependencyMissing,
            SkillError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            SkillError::HttpStatus { .. } => ErrorKind::HttpStatus,
            SkillError::Timeout { .. } => ErrorKind::Timeout,
            SkillError::Interrupted => ErrorKind::Interrupted,
            SkillError::Other { .. } => ErrorKind::Other,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            SkillError::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Process exit code for a report that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SkillError::Interrupted => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_carries_code_and_reason() {
        let err = SkillError::http_status(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn other_message_names_the_failure_class() {
        let err = SkillError::other("ConnectError", "connection refused");
        assert_eq!(err.to_string(), "ConnectError: connection refused");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn invalid_url_serializes_with_uppercase_acronym() {
        let kind = serde_json::to_value(ErrorKind::InvalidUrl).unwrap();
        assert_eq!(kind, "InvalidURL");
    }

    #[test]
    fn interruption_has_distinct_exit_code() {
        assert_eq!(SkillError::Interrupted.exit_code(), 130);
        assert_eq!(SkillError::Timeout { seconds: 30 }.exit_code(), 1);
        assert_eq!(
            SkillError::Timeout { seconds: 30 }.to_string(),
            "Request timed out (30 seconds)"
        );
    }
}
