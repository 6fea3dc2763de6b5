//! Subprocess invocation of the container engine CLI.
//!
//! Every engine interaction goes through [`EngineRunner`], which keeps the
//! orchestrator testable without a running daemon. [`CliEngine`] is the
//! production implementation backed by `tokio::process`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::SessionError;

/// Boxed future type returned by [`EngineRunner`] implementors.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How the engine subprocess is wired to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDiscipline {
    /// stdin, stdout and stderr connected to the terminal.
    Inherit,
    /// stdout discarded, stderr still visible.
    Quiet,
    /// Long-lived interactive attach; wired like [`IoDiscipline::Inherit`].
    Attach,
}

/// Behaviour required to drive a container engine.
pub trait EngineRunner: Send + Sync {
    /// Run the engine with `args` and wait for it to exit.
    ///
    /// A non-zero exit or a spawn failure yields
    /// [`SessionError::SubprocessFailed`].
    fn run(&self, args: Vec<String>, discipline: IoDiscipline)
    -> EngineFuture<'_, Result<(), SessionError>>;

    /// Run the engine with `args` and return its stdout.
    ///
    /// stderr is discarded. Failures are reported as for [`EngineRunner::run`].
    fn capture(&self, args: Vec<String>) -> EngineFuture<'_, Result<String, SessionError>>;
}

/// Engine runner that shells out to a `docker`-compatible binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliEngine {
    program: String,
}

impl CliEngine {
    /// Create a runner for the given engine command (`docker`, `podman`, ...).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The engine command this runner invokes.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn render(&self, args: &[String]) -> String {
        let mut rendered = self.program.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args);
        command
    }
}

impl EngineRunner for CliEngine {
    fn run(
        &self,
        args: Vec<String>,
        discipline: IoDiscipline,
    ) -> EngineFuture<'_, Result<(), SessionError>> {
        Box::pin(async move {
            let rendered = self.render(&args);
            info!(target: "lazylab::engine", "+ {rendered}");

            let mut command = self.command(&args);
            if discipline == IoDiscipline::Quiet {
                command.stdout(Stdio::null());
            }

            let status = command
                .status()
                .await
                .map_err(|err| SessionError::SubprocessFailed {
                    command: rendered.clone(),
                    status: err.to_string(),
                })?;

            if status.success() {
                Ok(())
            } else {
                Err(SessionError::SubprocessFailed {
                    command: rendered,
                    status: status.to_string(),
                })
            }
        })
    }

    fn capture(&self, args: Vec<String>) -> EngineFuture<'_, Result<String, SessionError>> {
        Box::pin(async move {
            let rendered = self.render(&args);
            let output = self
                .command(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .output()
                .await
                .map_err(|err| SessionError::SubprocessFailed {
                    command: rendered.clone(),
                    status: err.to_string(),
                })?;

            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            } else {
                Err(SessionError::SubprocessFailed {
                    command: rendered,
                    status: output.status.to_string(),
                })
            }
        })
    }
}

/// Whether a failed engine call aborts the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Failure is fatal.
    Required,
    /// Failure is logged and the session continues.
    BestEffort,
}

/// Tagged result of one orchestrator step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The call succeeded.
    Completed,
    /// A best-effort call failed.
    Warned(SessionError),
    /// A required call failed.
    Failed(SessionError),
}

impl StepOutcome {
    /// Tag `result` according to `policy`.
    #[must_use]
    pub fn classify(result: Result<(), SessionError>, policy: Policy) -> Self {
        match (result, policy) {
            (Ok(()), _) => Self::Completed,
            (Err(err), Policy::BestEffort) => Self::Warned(err),
            (Err(err), Policy::Required) => Self::Failed(err),
        }
    }

    /// Log warnings and surface only failures.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error for [`StepOutcome::Failed`].
    pub fn settle(self, step: &str) -> Result<(), SessionError> {
        match self {
            Self::Completed => Ok(()),
            Self::Warned(err) => {
                warn!(error = %err, "{step} failed (non-fatal)");
                Ok(())
            }
            Self::Failed(err) => Err(err),
        }
    }
}

/// Run one engine call under `policy` and settle its outcome.
///
/// # Errors
///
/// Returns the engine error when `policy` is [`Policy::Required`].
pub async fn run_step<E: EngineRunner + ?Sized>(
    engine: &E,
    args: Vec<String>,
    discipline: IoDiscipline,
    policy: Policy,
    step: &str,
) -> Result<(), SessionError> {
    let result = engine.run(args, discipline).await;
    StepOutcome::classify(result, policy).settle(step)
}

/// Run one best-effort engine call, returning whether it succeeded.
///
/// Failures are logged as warnings and never propagate.
pub async fn best_effort<E: EngineRunner + ?Sized>(
    engine: &E,
    args: Vec<String>,
    discipline: IoDiscipline,
    step: &str,
) -> bool {
    let result = engine.run(args, discipline).await;
    match StepOutcome::classify(result, Policy::BestEffort) {
        StepOutcome::Completed => true,
        StepOutcome::Warned(err) | StepOutcome::Failed(err) => {
            warn!(error = %err, "{step} failed (non-fatal)");
            false
        }
    }
}

/// Build an owned argument vector from string slices.
#[must_use]
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
