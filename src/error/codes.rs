/// Error code registry for the planner
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Scheduling and catalog errors
/// - 3000-3999: Storage errors
/// - 4000-4999: Execution engine errors
/// - 5000-5999: Symptom report errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Scheduling and catalog errors (2000-2999)
    pub const SCHEDULE_NOT_FOUND: u16 = 2000;
    pub const SCHEDULE_CONFLICT: u16 = 2001;
    pub const SCHEDULE_PATIENT_NOT_FOUND: u16 = 2002;
    pub const SCHEDULE_ROUTINE_NOT_FOUND: u16 = 2003;
    pub const SCHEDULE_ASSIGNMENT_NOT_FOUND: u16 = 2004;
    pub const SCHEDULE_PATIENT_NOT_ASSIGNABLE: u16 = 2005;
    pub const CATALOG_EXERCISE_NOT_FOUND: u16 = 2010;
    pub const CATALOG_DUPLICATE_NAME: u16 = 2011;

    // Storage errors (3000-3999)
    pub const STORAGE_GENERIC: u16 = 3000;
    pub const STORAGE_IO_ERROR: u16 = 3001;
    pub const STORAGE_LOCK_BUSY: u16 = 3008;
    pub const STORAGE_TEMPORARY: u16 = 3009;
    pub const STORAGE_SERIALIZATION_ERROR: u16 = 3011;

    // Execution engine errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_INVALID_TRANSITION: u16 = 4001;
    pub const EXEC_SESSION_CLOSED: u16 = 4002;
    pub const EXEC_TIMER_INTEGRITY: u16 = 4003;

    // Symptom report errors (5000-5999)
    pub const REPORT_NOT_FOUND: u16 = 5001;
    pub const REPORT_ALREADY_SUBMITTED: u16 = 5002;

    // Validation errors (7000-7999)
    pub const VALIDATION_GENERIC: u16 = 7000;
    pub const VALIDATION_REQUIRED_FIELD: u16 = 7001;
    pub const VALIDATION_INVALID_DOSAGE: u16 = 7002;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7003;
    pub const VALIDATION_INVALID_FORMAT: u16 = 7005;
    pub const VALIDATION_DUPLICATE_VALUE: u16 = 7007;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_INTERNAL_ERROR: u16 = 9004;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Failed to parse configuration",
        1003 => "Invalid value in configuration",

        2000 => "Scheduled entity not found",
        2001 => "Routine already assigned to the patient on this date",
        2002 => "Patient not found",
        2003 => "Routine not found",
        2004 => "Assignment not found",
        2005 => "Patient is not eligible for assignments",
        2010 => "Exercise not found",
        2011 => "Name already in use",

        3000 => "Generic storage error",
        3001 => "Storage I/O error",
        3008 => "Storage lock is busy",
        3009 => "Temporary storage error",
        3011 => "Storage serialization error",

        4000 => "Generic execution error",
        4001 => "Action not allowed in the current execution phase",
        4002 => "Execution session already closed",
        4003 => "Timer tick fired without an owning state",

        5001 => "Symptom report not found",
        5002 => "Symptom report already submitted for today",

        7000 => "Generic validation error",
        7001 => "Required field is missing",
        7002 => "Unrecognized repetitions or duration text",
        7003 => "Value out of allowed range",
        7005 => "Invalid format",
        7007 => "Duplicate value",

        9000 => "Generic error",
        9004 => "Internal error",

        _ => "Unknown error code",
    }
}
