//! Command-line argument definitions for lazylab.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use super::{ResourceLimits, SecurityOptions, SessionConfig};

/// Command-line interface for lazylab.
///
/// Without a subcommand, lazylab starts a session from the session flags.
#[derive(Debug, Parser)]
#[command(name = "lazylab")]
#[command(
    author,
    version,
    about = "Run throwaway, locked-down containers for malware analysis",
    long_about = "lazylab runs containers for malware analysis with resource limits, \
                  isolation and profiles, then tears them down when the shell exits."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine command (`docker`, `podman`, ...).
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Session flags shared by the root command and `profile run`/`save`.
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage lazylab profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

/// Profile management subcommands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Save current flags as a profile.
    Save(ProfileNameArgs),
    /// List profiles.
    List,
    /// Run a session using a profile; flags override its values.
    Run(ProfileNameArgs),
    /// Delete a profile.
    Delete(ProfileNameArgs),
    /// Edit a profile in $EDITOR.
    Edit(ProfileEditArgs),
}

/// A single profile name argument.
#[derive(Debug, Args)]
pub struct ProfileNameArgs {
    /// Profile name (an extension of `.json`, `.yaml` or `.yml` picks the format).
    #[arg(required = true)]
    pub name: String,
}

/// Arguments for `profile edit`.
#[derive(Debug, Args)]
pub struct ProfileEditArgs {
    /// Profile name.
    #[arg(required = true)]
    pub name: String,

    /// Editor to use instead of `$EDITOR`.
    #[arg(long)]
    pub editor: Option<String>,
}

/// Session flags, accepted globally so `profile run` can override a profile.
#[derive(Debug, Default, Args)]
pub struct SessionArgs {
    /// Packages to install via brew inside the container.
    #[arg(short = 'p', long, global = true, value_delimiter = ',')]
    pub packages: Vec<String>,

    /// Copy files/dirs into the container (made read-only).
    #[arg(short = 'c', long = "copy", global = true, value_delimiter = ',')]
    pub copy: Vec<String>,

    /// Bind mount files/dirs (`host[:container]`).
    #[arg(short = 'm', long = "mount", global = true, value_delimiter = ',')]
    pub mounts: Vec<String>,

    /// Custom container name.
    #[arg(short = 'n', long, global = true)]
    pub name: Option<String>,

    /// Prefix for generated container names.
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Stop and remove the container after exit.
    #[arg(long, global = true)]
    pub purge: bool,

    /// Disable network access inside the container.
    #[arg(long = "no-net", global = true)]
    pub no_net: bool,

    /// Limit container memory (e.g. `1g`).
    #[arg(long, global = true)]
    pub memory: Option<String>,

    /// Limit number of CPUs.
    #[arg(long, global = true)]
    pub cpus: Option<String>,

    /// Limit number of processes inside the container.
    #[arg(long = "pids-limit", global = true)]
    pub pids_limit: Option<u32>,

    /// Make the container root filesystem read-only.
    #[arg(long = "read-only", global = true)]
    pub read_only: bool,

    /// Paths to remain writable in read-only mode.
    #[arg(long = "writable", global = true, value_delimiter = ',')]
    pub writable: Vec<String>,

    /// Force container architecture to amd64.
    #[arg(long, global = true)]
    pub amd64: bool,

    /// Stop the container gracefully instead of killing it.
    #[arg(long, global = true)]
    pub graceful: bool,

    /// Load and merge the named profile.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Container image to use (default `homebrew/brew:latest`).
    #[arg(long, global = true)]
    pub image: Option<String>,

    /// Print engine commands and debug information.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Drop all Linux capabilities in the container.
    #[arg(long = "cap-drop-all", global = true)]
    pub cap_drop_all: bool,

    /// Set the no-new-privileges security option.
    #[arg(long = "no-new-privs", global = true)]
    pub no_new_privs: bool,

    /// Shell to start inside the container (fish, bash, zsh, sh).
    #[arg(long, global = true)]
    pub shell: Option<String>,

    /// Cache package downloads in a named volume reused across runs.
    #[arg(long = "cache-packages", global = true)]
    pub cache_packages: bool,

    /// Run container processes as user (e.g. `1000:1000` or a name).
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Remove the package cache volume on exit.
    #[arg(long = "purge-cache", global = true)]
    pub purge_cache: bool,
}

impl SessionArgs {
    /// Convert the flags into an override layer for [`SessionConfig::merge`].
    #[must_use]
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            image: self.image.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            name_prefix: self.prefix.clone().unwrap_or_default(),
            packages: non_empty(&self.packages),
            copy_paths: non_empty(&self.copy),
            mounts: non_empty(&self.mounts),
            writable_paths: non_empty(&self.writable),
            limits: ResourceLimits {
                memory: self.memory.clone().unwrap_or_default(),
                cpus: self.cpus.clone().unwrap_or_default(),
                pids: self.pids_limit.unwrap_or_default(),
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
            verbose: self.verbose,
            shell: self.shell.clone().unwrap_or_default(),
            user: self.user.clone().unwrap_or_default(),
            cache_packages: self.cache_packages,
            purge_cache: self.purge_cache,
        }
    }
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(String::from)
        .collect()
}
