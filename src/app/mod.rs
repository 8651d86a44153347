//! Application module
//!
//! Wiring shared by the binary and the integration tests:
//! - Logging setup
//! - Fatal error reporting
//! - Construction of storage and services from configuration

pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{initialize_app, AppContext};
