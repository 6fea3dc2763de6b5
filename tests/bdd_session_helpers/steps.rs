//! Given/when steps for session scenarios.

use std::sync::Arc;

use lazylab::config::SessionConfig;
use lazylab::launch::PathResolver;
use lazylab::session::Orchestrator;
use rstest_bdd_macros::{given, when};
use tokio::sync::oneshot;

use super::StepResult;
use super::state::{SessionResult, SessionScenario};

fn update_config(
    session_scenario: &SessionScenario,
    change: impl FnOnce(&mut SessionConfig),
) -> StepResult<()> {
    let mut config = session_scenario
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    change(&mut config);
    session_scenario.config.set(config);
    Ok(())
}

fn engine(
    session_scenario: &SessionScenario,
) -> StepResult<Arc<super::engine::RecordingEngine>> {
    session_scenario
        .engine
        .get()
        .ok_or_else(|| String::from("engine should be initialised"))
}

#[given("an engine whose image provides {shell}")]
fn engine_provides_shell(session_scenario: &SessionScenario, shell: String) -> StepResult<()> {
    engine(session_scenario)?.provide_shell(&shell);
    Ok(())
}

#[given("an instance named {name} already exists")]
fn instance_already_exists(session_scenario: &SessionScenario, name: String) -> StepResult<()> {
    engine(session_scenario)?.add_existing(&name);
    Ok(())
}

#[given("the engine rejects {prefix} commands")]
fn engine_rejects(session_scenario: &SessionScenario, prefix: String) -> StepResult<()> {
    engine(session_scenario)?.fail_on(&prefix);
    Ok(())
}

#[given("the session is named {name}")]
fn session_named(session_scenario: &SessionScenario, name: String) -> StepResult<()> {
    update_config(session_scenario, |config| config.name = name)
}

#[given("a session mounting {path}")]
fn session_mounting(session_scenario: &SessionScenario, path: String) -> StepResult<()> {
    update_config(session_scenario, |config| config.mounts.push(path))
}

#[given("a session copying {path}")]
fn session_copying(session_scenario: &SessionScenario, path: String) -> StepResult<()> {
    update_config(session_scenario, |config| config.copy_paths.push(path))
}

#[given("the root filesystem is read-only")]
fn root_read_only(session_scenario: &SessionScenario) -> StepResult<()> {
    update_config(session_scenario, |config| {
        config.security.read_only_root = true;
    })
}

#[given("the session purges on exit")]
fn purges_on_exit(session_scenario: &SessionScenario) -> StepResult<()> {
    update_config(session_scenario, |config| config.purge_on_exit = true)
}

#[when("the session runs")]
fn session_runs(session_scenario: &SessionScenario) -> StepResult<()> {
    let config = session_scenario
        .config
        .get()
        .ok_or_else(|| String::from("config should be initialised"))?;
    let host = session_scenario
        .host
        .get()
        .ok_or_else(|| String::from("host directory should be initialised"))?;
    let orchestrator = Orchestrator::new(
        engine(session_scenario)?,
        PathResolver::new(host.root.clone()),
    )
    .with_tty(false);

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let (_tx, rx) = oneshot::channel();
    let result = match runtime.block_on(orchestrator.run(&config, move || rx)) {
        Ok(summary) => SessionResult::Ok(summary),
        Err(e) => SessionResult::Err(e.to_string()),
    };
    session_scenario.result.set(result);
    Ok(())
}
