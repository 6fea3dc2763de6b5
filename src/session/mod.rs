//! The session orchestrator.
//!
//! [`Orchestrator::run`] takes a merged [`SessionConfig`] through identity
//! resolution, preflight, creation, staging, provisioning and the interactive
//! attach, then tears the instance down. Once the instance exists, a
//! background listener waits on a single-slot shutdown channel and runs the
//! same teardown when a signal arrives; the [`Teardown`] once-flag guarantees
//! at most one stop and one removal across both paths. Until then signals
//! keep their default behaviour.
//!
//! Cancellation reaches the main sequence only through the instance being
//! stopped. In-flight engine calls then return, and the orchestrator checks
//! the once-flag between steps so nothing new starts after an interrupt.

mod attach;
mod provisioning;
mod signals;
mod staging;
mod teardown;


use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use signals::forward_os_signals;
pub use teardown::{Teardown, TeardownPlan};

use crate::config::SessionConfig;
use crate::engine::{
    CapabilityProber, EngineRunner, InstanceName, IoDiscipline, Policy, naming, run_step,
};
use crate::error::SessionError;
use crate::launch::{LaunchPlan, PathResolver, creation_args};

/// Lifecycle of one instance. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    /// Nothing created yet.
    Pending,
    /// The engine created the instance.
    Created,
    /// Writable paths and copies are in place.
    Staged,
    /// Packages are provisioned.
    Provisioned,
    /// An interactive shell was attached.
    Attached,
    /// The instance was stopped or killed.
    Stopped,
    /// The instance was removed.
    Removed,
}

impl SessionState {
    /// Move to `next` if it lies ahead of the current state.
    pub fn advance(&mut self, next: Self) {
        if next > *self {
            *self = next;
        }
    }
}

/// The OS signal that requested shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT (Ctrl-C).
    Interrupt,
    /// SIGTERM.
    Terminate,
}

/// What a finished session reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// The instance name used.
    pub name: InstanceName,
    /// The last lifecycle state reached.
    pub state: SessionState,
    /// The shell that was attached, if any.
    pub shell: Option<String>,
    /// Whether a shutdown signal ended the session.
    pub interrupted: bool,
}

/// Drives one session against a container engine.
pub struct Orchestrator<E: ?Sized> {
    engine: Arc<E>,
    resolver: PathResolver,
    tty: bool,
}

impl<E: EngineRunner + ?Sized + 'static> Orchestrator<E> {
    /// Create an orchestrator. The attach defaults to a TTY.
    #[must_use]
    pub const fn new(engine: Arc<E>, resolver: PathResolver) -> Self {
        Self {
            engine,
            resolver,
            tty: true,
        }
    }

    /// Choose between `exec -it` and `exec -i` for the attach.
    #[must_use]
    pub const fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    /// Run a full session and tear it down.
    ///
    /// `arm_shutdown` is called once, right after the instance has been
    /// created, and returns the channel the listener waits on. It is never
    /// called when the session fails before creation.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidName`] or [`SessionError::DuplicateName`]
    ///   before anything is created.
    /// - [`SessionError::PathNotFound`] or [`SessionError::InvalidMount`]
    ///   from preflight, before anything is created.
    /// - [`SessionError::CreationFailed`] when the engine cannot create the
    ///   instance.
    /// - [`SessionError::CopyFailed`] or [`SessionError::NoShellFound`],
    ///   reported after teardown has run.
    pub async fn run<A>(
        &self,
        config: &SessionConfig,
        arm_shutdown: A,
    ) -> Result<SessionSummary, SessionError>
    where
        A: FnOnce() -> oneshot::Receiver<ShutdownSignal>,
    {
        let name = self.resolve_identity(config).await?;
        let plan = LaunchPlan::prepare(config, name, &self.resolver)?;
        debug!(summary = %config.summary(), instance = %plan.name, "launching session");

        let discipline = if config.verbose {
            IoDiscipline::Inherit
        } else {
            IoDiscipline::Quiet
        };
        run_step(
            &*self.engine,
            creation_args(&plan),
            discipline,
            Policy::Required,
            "creating instance",
        )
        .await
        .map_err(|err| SessionError::CreationFailed {
            message: err.to_string(),
        })?;
        info!(instance = %plan.name, image = %plan.image, "instance created");

        let teardown = Arc::new(Teardown::new(
            Arc::clone(&self.engine),
            TeardownPlan::for_session(plan.name.clone(), config),
        ));
        let listener = arm(Arc::clone(&teardown), arm_shutdown());

        let mut state = SessionState::Created;
        let outcome = self.drive(&plan, config, &teardown, &mut state).await;
        let (final_state, interrupted) = disarm(listener, &teardown).await;
        state.advance(final_state);

        match outcome {
            Ok(shell) => Ok(SessionSummary {
                name: plan.name,
                state,
                shell,
                interrupted,
            }),
            Err(err) if interrupted => {
                debug!(error = %err, "ignoring error raised after shutdown signal");
                Ok(SessionSummary {
                    name: plan.name,
                    state,
                    shell: None,
                    interrupted,
                })
            }
            Err(err) => Err(err),
        }
    }

    async fn resolve_identity(&self, config: &SessionConfig) -> Result<InstanceName, SessionError> {
        let name = match config.requested_name() {
            Some(requested) => InstanceName::parse(requested)?,
            None => naming::generate(&config.name_prefix),
        };
        if naming::exists(&*self.engine, &name).await {
            return Err(SessionError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(name)
    }

    /// Staging, provisioning and attach. Returns `Ok(None)` when a shutdown
    /// signal claimed teardown before the shell was attached.
    async fn drive(
        &self,
        plan: &LaunchPlan,
        config: &SessionConfig,
        teardown: &Teardown<E>,
        state: &mut SessionState,
    ) -> Result<Option<String>, SessionError> {
        let engine = &*self.engine;
        let mut prober = CapabilityProber::new(engine, &plan.name);

        staging::create_writable_paths(engine, plan).await;
        staging::copy_sources(engine, plan, &prober).await?;
        state.advance(SessionState::Staged);
        if teardown.is_claimed() {
            return Ok(None);
        }

        provisioning::provision(engine, config, &mut prober, &plan.name).await;
        state.advance(SessionState::Provisioned);
        if teardown.is_claimed() {
            return Ok(None);
        }

        let shell =
            attach::attach_shell(engine, &plan.name, &config.shell, self.tty, &mut prober).await?;
        state.advance(SessionState::Attached);
        Ok(Some(shell))
    }
}

/// Spawn the listener that tears down on the first shutdown signal.
fn arm<E: EngineRunner + ?Sized + 'static>(
    teardown: Arc<Teardown<E>>,
    shutdown: oneshot::Receiver<ShutdownSignal>,
) -> JoinHandle<Option<SessionState>> {
    tokio::spawn(async move {
        match shutdown.await {
            Ok(signal) => {
                warn!(?signal, "shutdown requested; tearing down instance");
                teardown.run().await
            }
            Err(_closed) => None,
        }
    })
}

/// Run teardown on the normal path and retire the listener.
///
/// The listener is aborted when it never fired, or awaited when it already
/// claimed teardown so its engine calls finish first. Returns the state
/// teardown reached and whether the signal path ran it.
async fn disarm<E: EngineRunner + ?Sized>(
    listener: JoinHandle<Option<SessionState>>,
    teardown: &Teardown<E>,
) -> (SessionState, bool) {
    if let Some(state) = teardown.run().await {
        listener.abort();
        return (state, false);
    }
    match listener.await {
        Ok(Some(state)) => (state, true),
        Ok(None) | Err(_) => (SessionState::Stopped, true),
    }
}
