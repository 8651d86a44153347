use std::fmt::Display;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

/// The unified error type for the planner
///
/// Every variant carries a numeric code from [`ErrorCode`]. Storage-level
/// failures are translated into this taxonomy at the service boundary, so
/// callers never see backend-specific messages.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Conflict: {message}")]
    Conflict { code: u16, message: String },

    #[error("[E{code:04}] Not found: {message}")]
    NotFound {
        code: u16,
        message: String,
        entity: &'static str,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Execution error: {message}")]
    Execution { code: u16, message: String },

    /// A timer tick arrived while no ticking state owned it
    #[error("[E{code:04}] Timer integrity violated: {message}")]
    TimerIntegrity { code: u16, message: String },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlannerError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a conflict error with default code
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            code: ErrorCode::SCHEDULE_CONFLICT,
            message: message.into(),
        }
    }

    pub fn conflict_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    /// Create a not found error for the named entity kind
    pub fn not_found(entity: &'static str, message: impl Into<String>) -> Self {
        let code = match entity {
            "patient" => ErrorCode::SCHEDULE_PATIENT_NOT_FOUND,
            "routine" => ErrorCode::SCHEDULE_ROUTINE_NOT_FOUND,
            "assignment" => ErrorCode::SCHEDULE_ASSIGNMENT_NOT_FOUND,
            "exercise" => ErrorCode::CATALOG_EXERCISE_NOT_FOUND,
            "report" => ErrorCode::REPORT_NOT_FOUND,
            _ => ErrorCode::SCHEDULE_NOT_FOUND,
        };
        Self::NotFound {
            code,
            message: message.into(),
            entity,
        }
    }

    /// Create a validation error with default code
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::VALIDATION_GENERIC,
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
        }
    }

    /// Create a storage error with default code
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            code: ErrorCode::STORAGE_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn storage_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an execution engine error with specific code
    pub fn execution_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }

    /// Create a timer integrity error
    pub fn timer_integrity(message: impl Into<String>) -> Self {
        Self::TimerIntegrity {
            code: ErrorCode::EXEC_TIMER_INTEGRITY,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a source slot are returned unchanged.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Storage { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            _ => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Conflict { message, .. }
            | Self::NotFound { message, .. }
            | Self::Validation { message, .. }
            | Self::Storage { message, .. }
            | Self::Execution { message, .. }
            | Self::TimerIntegrity { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Conflict { .. } | Self::NotFound { .. } => 3,
            Self::Storage { .. } => 4,
            Self::Execution { .. } | Self::TimerIntegrity { .. } => 5,
            Self::Validation { .. } => 8,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Conflict { code, .. }
            | Self::NotFound { code, .. }
            | Self::Validation { code, .. }
            | Self::Storage { code, .. }
            | Self::Execution { code, .. }
            | Self::TimerIntegrity { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get the message shown to clinicians and patients
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict { code, .. } if *code == ErrorCode::SCHEDULE_CONFLICT => {
                "Routine already assigned for this date".to_string()
            }
            Self::Conflict { message, .. } => message.clone(),
            Self::NotFound { entity, .. } if *entity == "assignment" => {
                "Assignment not found, it may already be removed".to_string()
            }
            Self::NotFound { entity, .. } => format!("The requested {} was not found", entity),
            Self::Validation { message, field, .. } => {
                if let Some(f) = field {
                    format!("Invalid value for '{}': {}", f, message)
                } else {
                    format!("Invalid request: {}", message)
                }
            }
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Storage { .. }
            | Self::Execution { .. }
            | Self::TimerIntegrity { .. }
            | Self::Other { .. } => "Something went wrong, please try again".to_string(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        format!("{:#}", self)
    }

    /// Check if retrying the same request may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Storage { code, .. } => {
                *code == ErrorCode::STORAGE_TEMPORARY || *code == ErrorCode::STORAGE_LOCK_BUSY
            }
            Self::Other { .. } => true,
            _ => false,
        }
    }

    /// Check if this error is a duplicate-assignment or duplicate-report conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Type alias for Results using PlannerError
pub type Result<T> = std::result::Result<T, PlannerError>;
