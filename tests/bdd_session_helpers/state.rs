//! Scenario state for session behavioural tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use lazylab::config::SessionConfig;
use lazylab::session::SessionSummary;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tempfile::TempDir;

use super::engine::RecordingEngine;

/// Outcome of running the orchestrator.
#[derive(Debug, Clone)]
pub(crate) enum SessionResult {
    /// The session completed.
    Ok(SessionSummary),
    /// The session failed with this message.
    Err(String),
}

/// A host working directory holding `data/` and `sample.bin`.
#[derive(Debug)]
pub(crate) struct HostDir {
    _dir: TempDir,
    pub(crate) root: Utf8PathBuf,
}

#[derive(Default, ScenarioState)]
pub(crate) struct SessionScenario {
    pub(crate) engine: Slot<Arc<RecordingEngine>>,
    pub(crate) host: Slot<Arc<HostDir>>,
    pub(crate) config: Slot<SessionConfig>,
    pub(crate) result: Slot<SessionResult>,
}

#[fixture]
pub(crate) fn session_scenario() -> SessionScenario {
    let state = SessionScenario::default();
    state.engine.set(Arc::new(RecordingEngine::default()));
    state.config.set(SessionConfig {
        shell: String::from("bash"),
        stop_timeout_secs: 10,
        ..SessionConfig::default()
    });
    if let Some(host) = host_dir() {
        state.host.set(Arc::new(host));
    }
    state
}

fn host_dir() -> Option<HostDir> {
    let dir = TempDir::new().ok()?;
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).ok()?;
    std::fs::create_dir(root.join("data")).ok()?;
    std::fs::write(root.join("sample.bin"), b"MZ").ok()?;
    Some(HostDir { _dir: dir, root })
}
