//! Error handling utilities

use tracing::error;

/// Report a fatal error and exit with its status code
///
/// `PlannerError`s print their user message, plus the developer message
/// when `verbose >= 1`. Anything else prints its chain in verbose mode.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    use crate::error::PlannerError;

    error!("Fatal error: {}", error);

    let exit_code = if let Some(planner_err) = error.downcast_ref::<PlannerError>() {
        eprintln!("{}", planner_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", planner_err.developer_message());
        }

        planner_err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
        1
    };

    std::process::exit(exit_code)
}
