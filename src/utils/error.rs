use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuchaError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("WebDriver command '{command}' failed with status {status}: {message}")]
    WebDriverError {
        command: String,
        status: u16,
        message: String,
    },

    #[error("Timed out after {seconds}s waiting for {locator}")]
    Timeout { locator: String, seconds: u64 },

    #[error("Shortener error: {message}")]
    ShortenerError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Session,
    Lookup,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BuchaError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CsvError(_)
            | Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SessionError { .. } | Self::WebDriverError { .. } => ErrorCategory::Session,
            Self::Timeout { .. } => ErrorCategory::Lookup,
            Self::HttpError(_) | Self::ShortenerError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::StorageError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Lookup => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Session => ErrorSeverity::Critical,
        }
    }

    /// Whether the error aborts the whole run instead of a single restaurant.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Session
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check bucha.toml, the restaurants CSV and the environment variables"
            }
            ErrorCategory::Session => {
                "Make sure geckodriver is running and the Facebook credentials are valid"
            }
            ErrorCategory::Lookup => "The page layout may have changed; review the selectors",
            ErrorCategory::Network => "Check network connectivity and the webhook/shortener URLs",
            ErrorCategory::Storage => "Check that the output directory is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Session => format!("Could not start a browser session: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuchaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_and_session_errors_are_fatal() {
        assert!(BuchaError::config("no restaurants").is_fatal());
        assert!(BuchaError::session("login rejected").is_fatal());
        assert!(!BuchaError::Timeout {
            locator: "xpath=//div".to_string(),
            seconds: 10
        }
        .is_fatal());
    }

    #[test]
    fn test_severity_ordering() {
        assert_eq!(
            BuchaError::session("x").severity(),
            ErrorSeverity::Critical
        );
        assert!(BuchaError::config("x").severity() > ErrorSeverity::Medium);
        assert_eq!(BuchaError::session("x").exit_code(), 3);
    }
}
