//! Orchestration API for lazylab commands.
//!
//! This module provides the library-facing functions behind each command:
//! [`run_session`] for the root command, `profile run` and `--profile`, and
//! [`save_profile`], [`list_profiles`], [`delete_profile`] and
//! [`edit_profile`] for profile management. The CLI binary is a thin adapter
//! over these functions.
//!
//! All functions accept library-owned types (not clap types). They do not
//! print to stdout/stderr or call `std::process::exit`.

mod profile;
mod session;

pub use profile::{EditParams, delete_profile, edit_profile, list_profiles, save_profile};
pub use session::{INTERRUPTED_EXIT_CODE, SessionParams, resolve_session, run_session};

/// Outcome of a lazylab command.
///
/// Commands return either outright success or a command-specific exit code
/// that the CLI adapter maps to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed successfully (exit code 0).
    Success,
    /// The command completed but should end the process with a non-zero code.
    CommandExit {
        /// The exit code to report.
        code: i64,
    },
}
