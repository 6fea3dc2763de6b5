//! Session orchestration entry point.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::info;

use crate::config::{AppConfig, SessionConfig};
use crate::engine::CliEngine;
use crate::error::Result as LazylabResult;
use crate::launch::PathResolver;
use crate::profiles::ProfileStore;
use crate::session::{Orchestrator, SessionSummary, forward_os_signals};

use super::CommandOutcome;

/// Exit code reported when a shutdown signal ended the session.
pub const INTERRUPTED_EXIT_CODE: i64 = 130;

/// Parameters for running a session.
///
/// Groups the arguments required by [`run_session`] into a single struct to
/// satisfy the "no more than four parameters" convention.
pub struct SessionParams<'a, E: mockable::Env> {
    /// Application configuration (engine, default image, session defaults).
    pub config: &'a AppConfig,
    /// Values given explicitly on the command line.
    pub overrides: SessionConfig,
    /// Profile to load beneath the overrides, if any.
    pub profile: Option<&'a str>,
    /// Whether to attach the shell with a pseudo-terminal. The caller is
    /// responsible for determining whether the local terminal supports TTY.
    pub tty: bool,
    /// Tokio runtime handle for blocking execution.
    pub runtime_handle: &'a tokio::runtime::Handle,
    /// Environment variable provider for locating the profile store.
    pub env: &'a E,
}

/// Build the effective session configuration.
///
/// Layers, lowest first: application defaults, the named profile, then the
/// command-line overrides.
///
/// # Errors
///
/// Returns profile store errors when `profile` is given and cannot be loaded.
pub fn resolve_session<E: mockable::Env>(
    config: &AppConfig,
    overrides: SessionConfig,
    profile: Option<&str>,
    env: &E,
) -> LazylabResult<SessionConfig> {
    let mut base = SessionConfig::from_app_defaults(config);
    if let Some(name) = profile.map(str::trim).filter(|name| !name.is_empty()) {
        let store = ProfileStore::resolve(config, env)?;
        let layer = store.load(name)?.to_session_config();
        info!(profile = name, "loaded profile");
        base = SessionConfig::merge(base, layer);
    }
    Ok(SessionConfig::merge(base, overrides))
}

/// Run one interactive session to completion.
///
/// Resolves the configuration and drives the session on the given runtime.
/// SIGINT/SIGTERM are forwarded into the orchestrator's shutdown channel
/// only once the instance has been created.
///
/// # Errors
///
/// Returns `LazylabError` variants:
/// - `ProfileError` if the requested profile cannot be loaded.
/// - `FilesystemError` if the working directory cannot be resolved.
/// - `SessionError` for name, preflight, creation, copy and shell failures.
pub fn run_session<E: mockable::Env>(params: SessionParams<'_, E>) -> LazylabResult<CommandOutcome> {
    let SessionParams {
        config,
        overrides,
        profile,
        tty,
        runtime_handle,
        env,
    } = params;

    let session = resolve_session(config, overrides, profile, env)?;
    let resolver = PathResolver::from_current_dir()?;
    let engine = Arc::new(CliEngine::new(config.engine_command()));
    let orchestrator = Orchestrator::new(engine, resolver).with_tty(tty);

    let summary = runtime_handle.block_on(async {
        let mut forwarder = None;
        let result = orchestrator
            .run(&session, || {
                let (tx, rx) = oneshot::channel();
                forwarder = Some(forward_os_signals(tx));
                rx
            })
            .await;
        if let Some(handle) = forwarder {
            handle.abort();
        }
        result
    })?;

    Ok(outcome_for(&summary))
}

pub(super) const fn outcome_for(summary: &SessionSummary) -> CommandOutcome {
    if summary.interrupted {
        CommandOutcome::CommandExit {
            code: INTERRUPTED_EXIT_CODE,
        }
    } else {
        CommandOutcome::Success
    }
}
