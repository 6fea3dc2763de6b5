//! Recording engine double for session scenarios.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lazylab::engine::{EngineFuture, EngineRunner, IoDiscipline};
use lazylab::error::SessionError;

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<String>,
    existing: Vec<String>,
    shells: HashSet<String>,
    failing: Vec<String>,
}

/// Engine that records each command line and answers shell probes.
#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    recorded: Mutex<Recorded>,
}

impl RecordingEngine {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn provide_shell(&self, shell: &str) {
        self.lock().shells.insert(String::from(shell));
    }

    pub(crate) fn add_existing(&self, name: &str) {
        self.lock().existing.push(String::from(name));
    }

    pub(crate) fn fail_on(&self, prefix: &str) {
        self.lock().failing.push(String::from(prefix));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn record(&self, args: &[String]) -> Result<String, SessionError> {
        let line = args.join(" ");
        let mut recorded = self.lock();
        recorded.calls.push(line.clone());
        if recorded.failing.iter().any(|prefix| line.starts_with(prefix)) {
            return Err(SessionError::SubprocessFailed {
                command: format!("docker {line}"),
                status: String::from("exit status: 1"),
            });
        }
        Ok(line)
    }

    fn answer(&self, line: &str) -> Option<String> {
        let recorded = self.lock();
        if line.starts_with("ps -a") {
            return Some(recorded.existing.join("\n"));
        }
        let probed = line.split('\'').nth(1)?;
        (line.contains("command -v") && recorded.shells.contains(probed)).then(String::new)
    }
}

impl EngineRunner for RecordingEngine {
    fn run(
        &self,
        args: Vec<String>,
        _discipline: IoDiscipline,
    ) -> EngineFuture<'_, Result<(), SessionError>> {
        Box::pin(async move { self.record(&args).map(|_| ()) })
    }

    fn capture(&self, args: Vec<String>) -> EngineFuture<'_, Result<String, SessionError>> {
        Box::pin(async move {
            let line = self.record(&args)?;
            self.answer(&line)
                .ok_or_else(|| SessionError::SubprocessFailed {
                    command: format!("docker {line}"),
                    status: String::from("exit status: 1"),
                })
        })
    }
}
