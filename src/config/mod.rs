//! Configuration system for lazylab.
//!
//! Two layers of configuration meet here. [`AppConfig`] holds the persistent
//! settings (engine command, default image, session defaults, profile
//! directory) and is loaded with `ortho_config` precedence: CLI flags override
//! environment variables, which override configuration files, which override
//! defaults. [`SessionConfig`] is the per-run record handed to the
//! orchestrator, built from the application defaults, an optional profile and
//! the session flags.
//!
//! The configuration file is expected at `~/.config/lazylab/config.toml` by default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine = "podman"
//! image = "homebrew/brew:latest"
//!
//! [session]
//! name_prefix = "triage"
//! shell = "bash"
//! stop_timeout_secs = 20
//!
//! [profiles]
//! dir = "/home/analyst/.lazylab/profiles"
//! ```

mod cli;
mod loader;
mod session;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, ProfileCommand, ProfileEditArgs, ProfileNameArgs, SessionArgs};
pub use loader::{env_var_names, load_config};
pub use session::{ResourceLimits, SecurityOptions, SessionConfig};
pub use types::{
    AppConfig, DEFAULT_ENGINE, DEFAULT_NAME_PREFIX, DEFAULT_SHELL, DEFAULT_STOP_TIMEOUT_SECS,
    ProfilesConfig, SessionDefaults,
};
