use crate::core::card::CardValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SafariError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error(transparent)]
    CardError(#[from] CardValidationError),

    #[error("Booking rejected by server (HTTP {status}): {message}")]
    BookingRejected { status: u16, message: String },

    #[error("Booking not found: {booking_code}")]
    BookingNotFound { booking_code: String },

    #[error("A booking submission is already in progress")]
    SubmissionInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Network,
    Configuration,
    Input,
    Booking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SafariError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SafariError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SafariError::IoError(_) | SafariError::SerializationError(_) => ErrorCategory::Storage,
            SafariError::ApiError(_) => ErrorCategory::Network,
            SafariError::ConfigError { .. }
            | SafariError::ConfigValidationError { .. }
            | SafariError::InvalidConfigValueError { .. }
            | SafariError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SafariError::ValidationError { .. } | SafariError::CardError(_) => ErrorCategory::Input,
            SafariError::BookingRejected { .. }
            | SafariError::BookingNotFound { .. }
            | SafariError::SubmissionInProgress => ErrorCategory::Booking,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SafariError::ValidationError { .. }
            | SafariError::CardError(_)
            | SafariError::SubmissionInProgress
            | SafariError::BookingNotFound { .. } => ErrorSeverity::Low,
            SafariError::ApiError(_) | SafariError::BookingRejected { .. } => ErrorSeverity::Medium,
            SafariError::ConfigError { .. }
            | SafariError::ConfigValidationError { .. }
            | SafariError::InvalidConfigValueError { .. }
            | SafariError::MissingConfigError { .. }
            | SafariError::SerializationError(_) => ErrorSeverity::High,
            SafariError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Network and endpoint failures can be retried by the user as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SafariError::ApiError(_) | SafariError::BookingRejected { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SafariError::ApiError(_) | SafariError::BookingRejected { .. } => {
                "There was an error submitting your booking. Please try again or contact us directly."
                    .to_string()
            }
            SafariError::CardError(e) => e.to_string(),
            SafariError::ValidationError { message, .. } => message.clone(),
            SafariError::BookingNotFound { booking_code } => {
                format!("No booking was found for code {}", booking_code)
            }
            SafariError::SubmissionInProgress => {
                "Your booking is still being submitted. Please wait.".to_string()
            }
            SafariError::IoError(_) | SafariError::SerializationError(_) => {
                "The cart could not be saved on this device.".to_string()
            }
            _ => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your connection and submit the booking again",
            ErrorCategory::Booking => match self {
                SafariError::BookingNotFound { .. } => "Double-check the booking code",
                SafariError::SubmissionInProgress => "Wait for the current submission to finish",
                _ => "Try again later or contact the conservancy directly",
            },
            ErrorCategory::Input => "Correct the highlighted field and submit again",
            ErrorCategory::Configuration => "Review the configuration file and CLI flags",
            ErrorCategory::Storage => "Make sure the storage directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, SafariError>;
