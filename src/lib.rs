//! Throwaway analysis containers driven through a container engine CLI.
//!
//! `lazylab` starts a locked-down container for inspecting untrusted files,
//! stages host material into it, installs the tools the analyst asks for,
//! attaches an interactive shell, and tears the container down when the
//! shell exits or the process is interrupted.
//!
//! # Architecture
//!
//! Every engine interaction is a `docker` (or compatible) subprocess behind
//! the [`engine::EngineRunner`] trait, so the orchestrator can be exercised
//! against a recording fake. Teardown is armed once the container exists and
//! runs at most once, whether the session ends normally or by signal.
//!
//! # Modules
//!
//! - [`api`]: Library-facing command functions used by the CLI binary
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`engine`]: Engine subprocess invocation, naming and capability probes
//! - [`error`]: Semantic error types for the application
//! - [`launch`]: Preflight path resolution and creation arguments
//! - [`profiles`]: Named profiles stored as YAML or JSON
//! - [`session`]: The session orchestrator and teardown

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch;
pub mod profiles;
pub mod session;
