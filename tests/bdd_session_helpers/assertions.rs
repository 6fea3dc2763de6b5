//! Assertion helpers for session behavioural tests.

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{SessionResult, SessionScenario};

fn calls(session_scenario: &SessionScenario) -> StepResult<Vec<String>> {
    session_scenario
        .engine
        .get()
        .map(|engine| engine.calls())
        .ok_or_else(|| String::from("engine should be initialised"))
}

fn creation_call(session_scenario: &SessionScenario) -> StepResult<String> {
    calls(session_scenario)?
        .into_iter()
        .find(|call| call.starts_with("run "))
        .ok_or_else(|| String::from("expected a creation call"))
}

fn instance_name(session_scenario: &SessionScenario) -> StepResult<String> {
    match session_scenario.result.get() {
        Some(SessionResult::Ok(summary)) => Ok(String::from(summary.name.as_str())),
        Some(SessionResult::Err(_)) | None => {
            let creation = creation_call(session_scenario)?;
            creation
                .split_whitespace()
                .skip_while(|word| *word != "--name")
                .nth(1)
                .map(String::from)
                .ok_or_else(|| format!("no --name in {creation}"))
        }
    }
}

#[then("the session succeeds with shell {shell}")]
fn session_succeeds(session_scenario: &SessionScenario, shell: String) -> StepResult<()> {
    match session_scenario.result.get() {
        Some(SessionResult::Ok(summary)) if summary.shell.as_deref() == Some(shell.as_str()) => {
            Ok(())
        }
        Some(SessionResult::Ok(summary)) => {
            Err(format!("expected shell {shell}, got {:?}", summary.shell))
        }
        Some(SessionResult::Err(msg)) => Err(format!("expected success, got error: {msg}")),
        None => Err(String::from("result should be set")),
    }
}

#[then("the session fails with {message}")]
fn session_fails(session_scenario: &SessionScenario, message: String) -> StepResult<()> {
    match session_scenario.result.get() {
        Some(SessionResult::Err(msg)) if msg.contains(&message) => Ok(()),
        Some(SessionResult::Err(msg)) => Err(format!("expected '{message}' in error, got: {msg}")),
        Some(SessionResult::Ok(summary)) => Err(format!(
            "expected failure, got success for {}",
            summary.name
        )),
        None => Err(String::from("result should be set")),
    }
}

#[then("the instance was created read-only with a tmpfs at {path}")]
fn created_read_only(session_scenario: &SessionScenario, path: String) -> StepResult<()> {
    let creation = creation_call(session_scenario)?;
    let tmpfs = format!("--mount type=tmpfs,destination={path}");
    if creation.contains("--read-only") && creation.contains(&tmpfs) {
        Ok(())
    } else {
        Err(format!("unexpected creation call: {creation}"))
    }
}

#[then("the mount targets {target}")]
fn mount_targets(session_scenario: &SessionScenario, target: String) -> StepResult<()> {
    let creation = creation_call(session_scenario)?;
    let destination = format!(",dst={target} ");
    if creation.contains("type=bind,src=") && creation.contains(&destination) {
        Ok(())
    } else {
        Err(format!("no bind mount to {target} in: {creation}"))
    }
}

#[then("the instance was killed and removed")]
fn killed_and_removed(session_scenario: &SessionScenario) -> StepResult<()> {
    let name = instance_name(session_scenario)?;
    let recorded = calls(session_scenario)?;
    let tail: Vec<&str> = recorded.iter().rev().take(2).rev().map(String::as_str).collect();
    let expected = [format!("kill {name}"), format!("rm {name}")];
    if tail == expected {
        Ok(())
    } else {
        Err(format!("expected {expected:?} at the end, got {tail:?}"))
    }
}

#[then("the instance was killed but kept")]
fn killed_but_kept(session_scenario: &SessionScenario) -> StepResult<()> {
    let name = instance_name(session_scenario)?;
    let recorded = calls(session_scenario)?;
    let killed = recorded.iter().filter(|call| **call == format!("kill {name}")).count();
    let removed = recorded.iter().any(|call| call.starts_with("rm "));
    if killed == 1 && !removed {
        Ok(())
    } else {
        Err(format!("unexpected teardown calls: {recorded:?}"))
    }
}

#[then("no instance was created")]
fn no_instance_created(session_scenario: &SessionScenario) -> StepResult<()> {
    let recorded = calls(session_scenario)?;
    if recorded
        .iter()
        .any(|call| call.starts_with("run ") || call.starts_with("exec "))
    {
        Err(format!("expected no run or exec calls, got {recorded:?}"))
    } else {
        Ok(())
    }
}
