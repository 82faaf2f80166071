use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required value: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to decode response: {message}")]
    DecodeError { message: String },

    #[error("Invalid version: {version}")]
    InvalidVersionError { version: String },

    #[error("Download failed: {message}")]
    DownloadError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ViewerError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::DownloadError { .. } => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Io,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_)
            | Self::DecodeError { .. }
            | Self::InvalidVersionError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::HttpError(e) if e.is_builder() => ErrorSeverity::High,
            Self::HttpError(_) | Self::DownloadError { .. } => ErrorSeverity::Medium,
            Self::DecodeError { .. }
            | Self::SerializationError(_)
            | Self::InvalidVersionError { .. } => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => "The server did not answer in time".to_string(),
            Self::HttpError(_) => "Could not reach the server".to_string(),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(_) | Self::DecodeError { .. } => {
                "GitHub returned data in an unexpected format".to_string()
            }
            Self::InvalidVersionError { version } => {
                format!("'{}' is not a numeric version", version)
            }
            Self::DownloadError { message } => format!("Download failed: {}", message),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("Invalid configuration: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your connection, or raise --timeout and try again",
            ErrorCategory::Io => "Check that the target directory exists and is writable",
            ErrorCategory::Configuration => "Review the command line flags and the config file",
            ErrorCategory::Data => "Check the owner, repository and tag names",
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_high_severity() {
        let err = ViewerError::MissingConfigError {
            field: "url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.to_string(), "Missing required value: url");
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = ViewerError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("denied"));
    }

    #[test]
    fn test_version_error_message() {
        let err = ViewerError::InvalidVersionError {
            version: "v1.x".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.user_friendly_message(), "'v1.x' is not a numeric version");
    }
}
