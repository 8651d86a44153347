use super::{ErrorCode, PlannerError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    fn to_config_error(self, message: impl Into<String>) -> Result<T, PlannerError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_config_error(self, message: impl Into<String>) -> Result<T, PlannerError> {
        self.map_err(|e| PlannerError::config(message).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> PlannerError {
        PlannerError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    pub fn missing_required_field(field: &str) -> PlannerError {
        PlannerError::validation_with_code(
            ErrorCode::VALIDATION_REQUIRED_FIELD,
            format!("Required field '{}' is missing", field),
            Some(field.to_string()),
        )
    }

    /// Patient exists but is pending approval or deactivated
    pub fn patient_not_assignable(patient_id: impl std::fmt::Display, status: &str) -> PlannerError {
        PlannerError::NotFound {
            code: ErrorCode::SCHEDULE_PATIENT_NOT_ASSIGNABLE,
            message: format!("Patient {} is {} and cannot receive routines", patient_id, status),
            entity: "patient",
        }
    }

    pub fn invalid_transition(action: &str, phase: impl std::fmt::Debug) -> PlannerError {
        PlannerError::execution_with_code(
            ErrorCode::EXEC_INVALID_TRANSITION,
            format!("'{}' is not allowed while {:?}", action, phase),
        )
    }
}
