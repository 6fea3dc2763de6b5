//! Semantic error types for the lazylab application.
//!
//! This module defines the error hierarchy for lazylab, following the principle
//! of using semantic error enums (via `thiserror`) for conditions the caller
//! might inspect or map to an exit status, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised while driving a container session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The instance name does not satisfy the engine identifier grammar.
    #[error("invalid container name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// An instance with the requested name already exists.
    #[error("container name already exists: {name:?}")]
    DuplicateName {
        /// The colliding name.
        name: String,
    },

    /// A host path named for staging or mounting does not exist.
    #[error("{role} path not found: {path}")]
    PathNotFound {
        /// Whether the path was a copy source or a mount source.
        role: &'static str,
        /// The exact path that failed the existence check.
        path: PathBuf,
    },

    /// A mount specification carries a relative container-side path.
    #[error("mount container path must be absolute: {container_path:?}")]
    InvalidMount {
        /// The offending container path.
        container_path: String,
    },

    /// The engine failed to create the instance.
    #[error("failed to create container: {message}")]
    CreationFailed {
        /// A description of the creation failure.
        message: String,
    },

    /// Copying host material into the instance failed.
    #[error("failed to copy {path} into container '{container}': {message}")]
    CopyFailed {
        /// The instance name.
        container: String,
        /// The host path being copied.
        path: PathBuf,
        /// A description of the copy failure.
        message: String,
    },

    /// None of the candidate shells is available inside the instance.
    #[error("no usable shell found in container '{container}' (tried {tried})")]
    NoShellFound {
        /// The instance name.
        container: String,
        /// Comma-separated list of probed shells.
        tried: String,
    },

    /// An engine subprocess exited unsuccessfully or could not be spawned.
    #[error("`{command}` failed: {status}")]
    SubprocessFailed {
        /// The engine command line, space-joined.
        command: String,
        /// The exit status or spawn error.
        status: String,
    },
}

/// Errors that can occur during filesystem operations.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// A file or directory was not found.
    #[error("path not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Permission denied when accessing a path.
    #[error("permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: PathBuf,
    },

    /// An I/O error occurred.
    #[error("I/O error at '{path}': {message}")]
    IoError {
        /// The path where the error occurred.
        path: PathBuf,
        /// A description of the I/O error.
        message: String,
    },
}

/// Errors raised by the named-profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile name is empty or would escape the profile directory.
    #[error("invalid profile name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// No profile file exists under the requested name.
    #[error("profile not found: {name}")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// The profile file could not be encoded or decoded.
    #[error("failed to (de)serialise profile '{name}': {message}")]
    Format {
        /// The profile name.
        name: String,
        /// A description of the serialisation failure.
        message: String,
    },

    /// The profile directory could not be located.
    #[error("cannot locate profile directory: HOME is not set")]
    HomeUnavailable,

    /// No editor was configured for `profile edit`.
    #[error("no editor specified; set $EDITOR or pass --editor")]
    NoEditor,

    /// The editor could not be started.
    #[error("failed to launch editor '{editor}': {message}")]
    EditorFailed {
        /// The editor command.
        editor: String,
        /// A description of the launch failure.
        message: String,
    },
}

/// Top-level error type for the lazylab application.
///
/// This enum aggregates all domain-specific errors into a single type that can
/// be used throughout the application. At the application boundary (main.rs),
/// these errors are converted to `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum LazylabError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while driving a session.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An error occurred during filesystem operations.
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// An error occurred in the profile store.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// A specialised `Result` type for lazylab operations.
pub type Result<T> = std::result::Result<T, LazylabError>;
