//! Idempotent package provisioning through Homebrew.

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::engine::{CapabilityProber, EngineRunner, InstanceName, IoDiscipline, best_effort};

/// Environment that keeps `brew install` quiet and side-effect free.
const BREW_ENV: [&str; 4] = [
    "HOMEBREW_NO_AUTO_UPDATE=1",
    "HOMEBREW_NO_INSTALL_CLEANUP=1",
    "HOMEBREW_NO_ENV_HINTS=1",
    "HOMEBREW_NO_ANALYTICS=1",
];

const FISH: &str = "fish";

/// Arguments for a single quiet `brew install` of `packages`.
#[must_use]
pub(crate) fn brew_install_args(name: &InstanceName, packages: &[String]) -> Vec<String> {
    let mut args = vec![
        String::from("exec"),
        String::from(name.as_str()),
        String::from("env"),
    ];
    args.extend(BREW_ENV.iter().map(|var| String::from(*var)));
    args.extend(["brew", "install", "-q"].map(String::from));
    args.extend(packages.iter().cloned());
    args
}

/// Install missing packages and, when fish is the preferred shell, fish itself.
///
/// Only packages brew does not already report are installed, so a second
/// run against the same instance issues no install at all. Without network
/// access installs are skipped with a warning. Install failures are warnings.
pub(crate) async fn provision<E: EngineRunner + ?Sized>(
    engine: &E,
    config: &SessionConfig,
    prober: &mut CapabilityProber<'_, E>,
    name: &InstanceName,
) {
    let network = config.network_enabled();

    if !config.packages.is_empty() {
        if network {
            let missing = prober.missing_packages(&config.packages).await;
            if missing.is_empty() {
                debug!("all requested packages already installed");
            } else {
                best_effort(
                    engine,
                    brew_install_args(name, &missing),
                    IoDiscipline::Inherit,
                    "installing packages",
                )
                .await;
            }
        } else {
            warn!("network disabled; skipping package installs");
        }
    }

    let wants_fish = config.shell.is_empty() || config.shell == FISH;
    if wants_fish && network && !prober.has_executable(FISH).await {
        best_effort(
            engine,
            brew_install_args(name, &[String::from(FISH)]),
            IoDiscipline::Inherit,
            "installing fish",
        )
        .await;
    }
}
