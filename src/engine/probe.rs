//! Capability probes against a running instance.
//!
//! Probes never propagate errors: any engine failure reads as "absent".

use std::collections::HashSet;

use camino::Utf8PathBuf;
use tracing::debug;

use super::invoker::{EngineRunner, argv};
use super::naming::InstanceName;

/// Queries a running instance for shells, packages and its home directory.
///
/// Positive shell results are remembered for the prober's lifetime.
pub struct CapabilityProber<'a, E: ?Sized> {
    engine: &'a E,
    instance: &'a InstanceName,
    known_executables: HashSet<String>,
}

impl<'a, E: EngineRunner + ?Sized> CapabilityProber<'a, E> {
    /// Create a prober for `instance`.
    #[must_use]
    pub fn new(engine: &'a E, instance: &'a InstanceName) -> Self {
        Self {
            engine,
            instance,
            known_executables: HashSet::new(),
        }
    }

    /// Return whether `name` resolves on the instance's login `PATH`.
    pub async fn has_executable(&mut self, name: &str) -> bool {
        if self.known_executables.contains(name) {
            return true;
        }
        let script = format!("command -v {} >/dev/null 2>&1", shell_quote(name));
        let found = self.login_shell(&script).await.is_some();
        debug!(executable = name, found, "probed executable");
        if found {
            self.known_executables.insert(String::from(name));
        }
        found
    }

    /// Return whether brew reports `package` as an installed formula.
    pub async fn package_installed(&self, package: &str) -> bool {
        let script = format!(
            "brew list --formula --versions {} >/dev/null 2>&1",
            shell_quote(package)
        );
        let installed = self.login_shell(&script).await.is_some();
        debug!(package, installed, "probed package");
        installed
    }

    /// Return the subset of `packages` that is not yet installed, in order.
    pub async fn missing_packages(&self, packages: &[String]) -> Vec<String> {
        let mut missing = Vec::new();
        for package in packages {
            if !self.package_installed(package).await {
                missing.push(package.clone());
            }
        }
        missing
    }

    /// Ask the instance for `$HOME`; `None` unless it is a non-empty absolute path.
    pub async fn home_directory(&self) -> Option<Utf8PathBuf> {
        let output = self.login_shell("printf %s \"$HOME\"").await?;
        let home = output.trim();
        if home.starts_with('/') {
            Some(Utf8PathBuf::from(home))
        } else {
            debug!(home, "ignoring non-absolute $HOME");
            None
        }
    }

    async fn login_shell(&self, script: &str) -> Option<String> {
        self.engine
            .capture(argv(["exec", self.instance.as_str(), "sh", "-lc", script]))
            .await
            .ok()
    }
}

/// Quote `value` for a POSIX shell, always using single quotes.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
