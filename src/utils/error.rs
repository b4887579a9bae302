use thiserror::Error;

pub const NO_ALLOWED_CATEGORIES_MESSAGE: &str = "no allowed categories for user";
pub const INVALID_DATE_FILTER_MESSAGE: &str = "date filter missing/invalid";
pub const TRY_AGAIN_MESSAGE: &str = "try again later";

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Requester is not authenticated")]
    Unauthenticated,

    #[error("Requester has no active position")]
    NoPosition,

    #[error("Position grants no comfort categories")]
    NoAllowedCategories,

    #[error("Date range is missing or invalid")]
    InvalidOrMissingDateRange,

    #[error("Store failure: {message}")]
    Store { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Access,
    Request,
    Store,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
}

impl AvailabilityError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthenticated | Self::NoPosition | Self::NoAllowedCategories => {
                ErrorCategory::Access
            }
            Self::InvalidOrMissingDateRange => ErrorCategory::Request,
            Self::Store { .. } => ErrorCategory::Store,
            Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Access | ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
        }
    }

    /// Access and request errors are expected outcomes of a query, not faults.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Access | ErrorCategory::Request
        )
    }

    /// Reason shown to the caller in `AvailabilityResult::error`.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Access => NO_ALLOWED_CATEGORIES_MESSAGE.to_string(),
            ErrorCategory::Request => INVALID_DATE_FILTER_MESSAGE.to_string(),
            ErrorCategory::Store => TRY_AGAIN_MESSAGE.to_string(),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Pass a requester id with --user",
            Self::NoPosition | Self::NoAllowedCategories => {
                "Assign the user an active position with allowed categories"
            }
            Self::InvalidOrMissingDateRange => {
                "Provide both bounds as date-times with start before end"
            }
            Self::Store { .. } => "Check the store backend and retry the query",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "Check the JSON snapshot format",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value and rerun"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
