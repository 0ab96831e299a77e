use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::DeError),

    #[error("{origin} returned HTTP {status}")]
    SourceStatusError { origin: String, status: u16 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Token refresh failed with HTTP {status}: {detail}")]
    TokenRefreshError { status: u16, detail: String },

    #[error("Sending email failed with HTTP {status}: {detail}")]
    SendError { status: u16, detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Configuration,
    Delivery,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DigestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DigestError::ApiError(_)
            | DigestError::XmlError(_)
            | DigestError::SerializationError(_)
            | DigestError::SourceStatusError { .. } => ErrorCategory::Fetch,
            DigestError::ConfigError { .. }
            | DigestError::MissingConfigError { .. }
            | DigestError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DigestError::TokenRefreshError { .. } | DigestError::SendError { .. } => {
                ErrorCategory::Delivery
            }
            DigestError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Fetch => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
            ErrorCategory::Delivery => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DigestError::MissingConfigError { field } => {
                format!("{} is not set; it is required to send the digest", field)
            }
            DigestError::InvalidConfigValueError { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
            DigestError::ConfigError { message } => {
                format!("Could not load the digest configuration: {}", message)
            }
            DigestError::TokenRefreshError { status, .. } => format!(
                "Gmail rejected the OAuth refresh token (HTTP {})",
                status
            ),
            DigestError::SendError { status, .. } => {
                format!("Gmail refused to send the digest (HTTP {})", status)
            }
            DigestError::IoError(e) => format!("Could not write the digest file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set GMAIL_CLIENT_ID, GMAIL_CLIENT_SECRET, GMAIL_REFRESH_TOKEN and RECIPIENT_EMAIL, or run with DRY_RUN=1"
            }
            ErrorCategory::Delivery => {
                "Check that the refresh token is still valid and has the gmail.send scope"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Fetch => "Check network connectivity to arXiv and Semantic Scholar",
        }
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_high_severity() {
        let err = DigestError::MissingConfigError {
            field: "GMAIL_REFRESH_TOKEN".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("GMAIL_REFRESH_TOKEN"));
    }

    #[test]
    fn test_delivery_errors_carry_provider_detail() {
        let err = DigestError::TokenRefreshError {
            status: 400,
            detail: "{\"error\": \"invalid_grant\"}".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Delivery);
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_every_fatal_error_exits_non_zero() {
        let errors = vec![
            DigestError::ConfigError {
                message: "bad toml".to_string(),
            },
            DigestError::SendError {
                status: 500,
                detail: "backend error".to_string(),
            },
            DigestError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )),
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0, "{} should be fatal", err);
        }
    }
}
