//! The on-disk profile document and its mapping to a session configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ResourceLimits, SecurityOptions, SessionConfig};

/// A named, persisted set of session options.
///
/// Keys are camelCase in both YAML and JSON. Every key is optional when
/// reading; absent keys take their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// The profile's own name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Packages to install.
    pub packages: Vec<String>,
    /// Host paths copied into the instance.
    pub copy: Vec<String>,
    /// Bind mounts as `host` or `host:container`.
    pub mounts: Vec<String>,
    /// Explicit instance name.
    pub container_name: String,
    /// Prefix for generated instance names.
    pub prefix: String,
    /// Remove the instance on exit.
    pub purge: bool,
    /// Disable networking.
    pub no_net: bool,
    /// Memory limit.
    pub memory: String,
    /// CPU limit.
    pub cpus: String,
    /// Process-count limit; zero leaves it unlimited.
    pub pids_limit: u32,
    /// Read-only root filesystem.
    pub read_only: bool,
    /// Writable tmpfs paths.
    pub writable: Vec<String>,
    /// Force `linux/amd64`.
    pub amd64: bool,
    /// Graceful stop instead of kill.
    pub graceful: bool,
    /// Preferred shell.
    pub shell: String,
    /// User for processes in the instance.
    pub user: String,
    /// Drop all capabilities.
    pub cap_drop_all: bool,
    /// Set `no-new-privileges`.
    pub no_new_privs: bool,
    /// Mount the package cache volume.
    pub cache_packages: bool,
    /// Remove the package cache volume on exit.
    pub purge_cache: bool,
}

impl Profile {
    /// Capture the user-facing options of `config` under `name`.
    ///
    /// Verbosity and the stop timeout are runtime concerns and are not saved.
    #[must_use]
    pub fn from_session(name: &str, config: &SessionConfig) -> Self {
        Self {
            name: String::from(name),
            image: config.image.clone(),
            packages: config.packages.clone(),
            copy: config.copy_paths.clone(),
            mounts: config.mounts.clone(),
            container_name: config.name.clone(),
            prefix: config.name_prefix.clone(),
            purge: config.purge_on_exit,
            no_net: config.security.disable_network,
            memory: config.limits.memory.clone(),
            cpus: config.limits.cpus.clone(),
            pids_limit: config.limits.pids,
            read_only: config.security.read_only_root,
            writable: config.writable_paths.clone(),
            amd64: config.security.force_amd64,
            graceful: config.graceful_stop,
            shell: config.shell.clone(),
            user: config.user.clone(),
            cap_drop_all: config.security.drop_all_capabilities,
            no_new_privs: config.security.no_new_privileges,
            cache_packages: config.cache_packages,
            purge_cache: config.purge_cache,
        }
    }

    /// Build the profile layer that command-line flags are merged over.
    #[must_use]
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            image: self.image.clone(),
            name: self.container_name.clone(),
            name_prefix: self.prefix.clone(),
            packages: self.packages.clone(),
            copy_paths: self.copy.clone(),
            mounts: self.mounts.clone(),
            writable_paths: self.writable.clone(),
            limits: ResourceLimits {
                memory: self.memory.clone(),
                cpus: self.cpus.clone(),
                pids: self.pids_limit,
            },
            security: SecurityOptions {
                disable_network: self.no_net,
                read_only_root: self.read_only,
                force_amd64: self.amd64,
                drop_all_capabilities: self.cap_drop_all,
                no_new_privileges: self.no_new_privs,
            },
            purge_on_exit: self.purge,
            graceful_stop: self.graceful,
            stop_timeout_secs: 0,
            verbose: false,
            shell: self.shell.clone(),
            user: self.user.clone(),
            cache_packages: self.cache_packages,
            purge_cache: self.purge_cache,
        }
    }
}
