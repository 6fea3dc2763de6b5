//! The fully merged input handed to the session orchestrator.
//!
//! Empty strings, empty lists, `false` and zero all mean "not set". That
//! encoding lets [`SessionConfig::merge`] express the override rule as a
//! field-wise "non-empty wins" without wrapping every field in `Option`.

use serde::{Deserialize, Serialize};

use super::AppConfig;

/// Memory, CPU and process-count limits, passed to the engine verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Memory limit such as `1g` or `512m`.
    pub memory: String,
    /// CPU limit such as `2` or `0.5`.
    pub cpus: String,
    /// Maximum number of processes; zero leaves it unlimited.
    pub pids: u32,
}

/// Isolation switches applied at creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityOptions {
    /// Run without any network access.
    pub disable_network: bool,
    /// Mount the root filesystem read-only.
    pub read_only_root: bool,
    /// Force the `linux/amd64` platform.
    pub force_amd64: bool,
    /// Drop every Linux capability.
    pub drop_all_capabilities: bool,
    /// Set the `no-new-privileges` security option.
    pub no_new_privileges: bool,
}

/// Everything a session needs, resolved from defaults, profile and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Image reference; empty selects the built-in default image.
    pub image: String,
    /// Requested instance name; empty asks for a generated one.
    pub name: String,
    /// Prefix for generated names.
    pub name_prefix: String,
    /// Packages to install inside the instance.
    pub packages: Vec<String>,
    /// Host paths copied into the instance home and marked read-only.
    pub copy_paths: Vec<String>,
    /// Bind mounts as `host` or `host:container`.
    pub mounts: Vec<String>,
    /// Paths kept writable (tmpfs) under a read-only root.
    pub writable_paths: Vec<String>,
    /// Resource limits.
    pub limits: ResourceLimits,
    /// Isolation switches.
    pub security: SecurityOptions,
    /// Remove the instance after it stops.
    pub purge_on_exit: bool,
    /// Stop with a bounded grace period instead of killing.
    pub graceful_stop: bool,
    /// Graceful-stop window in seconds.
    pub stop_timeout_secs: u64,
    /// Echo engine commands and show their output.
    pub verbose: bool,
    /// Preferred interactive shell.
    pub shell: String,
    /// User (`uid:gid` or name) for processes in the instance.
    pub user: String,
    /// Reuse a named volume for package downloads.
    pub cache_packages: bool,
    /// Remove the package cache volume during teardown.
    pub purge_cache: bool,
}

impl SessionConfig {
    /// Seed a session with the defaults from the application configuration.
    #[must_use]
    pub fn from_app_defaults(app: &AppConfig) -> Self {
        Self {
            image: app.image.clone().unwrap_or_default(),
            name_prefix: app.session.name_prefix.clone(),
            shell: app.session.shell.clone(),
            stop_timeout_secs: app.session.stop_timeout_secs,
            ..Self::default()
        }
    }

    /// Layer `overrides` on top of `base`.
    ///
    /// A field from `overrides` replaces the base value only when it is set
    /// (non-empty, `true` or non-zero). `cache_packages` and `purge_cache`
    /// are OR-ed so either layer can enable them.
    #[must_use]
    pub fn merge(base: Self, overrides: Self) -> Self {
        let mut merged = base;

        override_string(&mut merged.image, overrides.image);
        override_string(&mut merged.name, overrides.name);
        override_string(&mut merged.name_prefix, overrides.name_prefix);
        override_list(&mut merged.packages, overrides.packages);
        override_list(&mut merged.copy_paths, overrides.copy_paths);
        override_list(&mut merged.mounts, overrides.mounts);
        override_list(&mut merged.writable_paths, overrides.writable_paths);

        override_string(&mut merged.limits.memory, overrides.limits.memory);
        override_string(&mut merged.limits.cpus, overrides.limits.cpus);
        if overrides.limits.pids != 0 {
            merged.limits.pids = overrides.limits.pids;
        }

        let security = &mut merged.security;
        security.disable_network |= overrides.security.disable_network;
        security.read_only_root |= overrides.security.read_only_root;
        security.force_amd64 |= overrides.security.force_amd64;
        security.drop_all_capabilities |= overrides.security.drop_all_capabilities;
        security.no_new_privileges |= overrides.security.no_new_privileges;

        merged.purge_on_exit |= overrides.purge_on_exit;
        merged.graceful_stop |= overrides.graceful_stop;
        merged.verbose |= overrides.verbose;
        if overrides.stop_timeout_secs != 0 {
            merged.stop_timeout_secs = overrides.stop_timeout_secs;
        }
        override_string(&mut merged.shell, overrides.shell);
        override_string(&mut merged.user, overrides.user);

        merged.cache_packages = overrides.cache_packages || merged.cache_packages;
        merged.purge_cache = overrides.purge_cache || merged.purge_cache;
        merged
    }

    /// Return the explicitly requested instance name, if any.
    #[must_use]
    pub fn requested_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|name| !name.is_empty())
    }

    /// Return whether the session may reach the network.
    #[must_use]
    pub const fn network_enabled(&self) -> bool {
        !self.security.disable_network
    }

    /// One-line summary used in verbose logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "name={} prefix={} net={} ro={} cpus={} mem={} image={}",
            self.name,
            self.name_prefix,
            self.network_enabled(),
            self.security.read_only_root,
            self.limits.cpus,
            self.limits.memory,
            self.image,
        )
    }
}

fn override_string(target: &mut String, value: String) {
    if !value.is_empty() {
        *target = value;
    }
}

fn override_list(target: &mut Vec<String>, value: Vec<String>) {
    if !value.is_empty() {
        *target = value;
    }
}
