//! At-most-once teardown shared by the normal path and the signal listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use super::SessionState;
use crate::config::SessionConfig;
use crate::engine::{EngineRunner, InstanceName, IoDiscipline, argv, best_effort};
use crate::launch::PACKAGE_CACHE_VOLUME;

/// Extra time granted to `stop --timeout` before lazylab gives up on it.
const STOP_MARGIN: Duration = Duration::from_secs(5);

/// What teardown does for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownPlan {
    /// Instance to stop.
    pub name: InstanceName,
    /// Use `stop --timeout` instead of `kill`.
    pub graceful: bool,
    /// Graceful-stop window in seconds.
    pub stop_timeout_secs: u64,
    /// Remove the instance after stopping it.
    pub purge: bool,
    /// Remove the package cache volume afterwards.
    pub purge_cache: bool,
}

impl TeardownPlan {
    /// Derive a teardown plan for `name` from the session configuration.
    #[must_use]
    pub fn for_session(name: InstanceName, config: &SessionConfig) -> Self {
        Self {
            name,
            graceful: config.graceful_stop,
            stop_timeout_secs: config.stop_timeout_secs,
            purge: config.purge_on_exit,
            purge_cache: config.purge_cache,
        }
    }
}

/// Stops (and optionally removes) an instance exactly once.
///
/// Whichever caller claims the once-flag first performs the engine calls;
/// every later call returns `None` without touching the engine.
pub struct Teardown<E: ?Sized> {
    engine: Arc<E>,
    plan: TeardownPlan,
    claimed: AtomicBool,
}

impl<E: EngineRunner + ?Sized> Teardown<E> {
    /// Create an unclaimed teardown.
    #[must_use]
    pub const fn new(engine: Arc<E>, plan: TeardownPlan) -> Self {
        Self {
            engine,
            plan,
            claimed: AtomicBool::new(false),
        }
    }

    /// Whether some caller has already claimed teardown.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Run teardown if nobody has yet.
    ///
    /// Returns the lifecycle state reached, or `None` when another caller
    /// already claimed it. Engine failures are logged, never raised.
    pub async fn run(&self) -> Option<SessionState> {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(instance = %self.plan.name, "teardown already claimed");
            return None;
        }

        self.stop().await;
        let mut state = SessionState::Stopped;

        let name = self.plan.name.as_str();
        if self.plan.purge
            && best_effort(
                &*self.engine,
                argv(["rm", name]),
                IoDiscipline::Inherit,
                "removing instance",
            )
            .await
        {
            state = SessionState::Removed;
        }

        if self.plan.purge_cache {
            best_effort(
                &*self.engine,
                argv(["volume", "rm", PACKAGE_CACHE_VOLUME]),
                IoDiscipline::Inherit,
                "removing package cache volume",
            )
            .await;
        }

        Some(state)
    }

    async fn stop(&self) {
        let name = self.plan.name.as_str();
        if !self.plan.graceful {
            best_effort(
                &*self.engine,
                argv(["kill", name]),
                IoDiscipline::Inherit,
                "killing instance",
            )
            .await;
            return;
        }

        let timeout = self.plan.stop_timeout_secs.to_string();
        let window = Duration::from_secs(self.plan.stop_timeout_secs).saturating_add(STOP_MARGIN);
        let stop = best_effort(
            &*self.engine,
            argv(["stop", "--timeout", timeout.as_str(), name]),
            IoDiscipline::Inherit,
            "stopping instance",
        );
        if tokio::time::timeout(window, stop).await.is_err() {
            warn!(instance = name, "graceful stop timed out; killing instance");
            best_effort(
                &*self.engine,
                argv(["kill", name]),
                IoDiscipline::Inherit,
                "killing instance",
            )
            .await;
        }
    }
}
