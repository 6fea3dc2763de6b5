//! Preflight and argument building for instance creation.
//!
//! [`LaunchPlan::prepare`] turns a merged [`SessionConfig`] into a record
//! whose host paths are absolute and known to exist. Every check here runs
//! before the engine creates anything, so a failure leaves nothing behind.

mod args;
mod paths;


use camino::Utf8PathBuf;

pub use args::{PACKAGE_CACHE_VOLUME, build_run_args, creation_args, keep_alive_args};
pub use paths::{
    COPY_ROLE, DEFAULT_IMAGE, MOUNT_ROLE, MountSpec, PathResolver, ResolvedMount,
    default_container_path, default_home, effective_image,
};

use crate::config::{ResourceLimits, SecurityOptions, SessionConfig};
use crate::engine::InstanceName;
use crate::error::SessionError;

/// Writable path injected when the root is read-only and none were requested.
pub const DEFAULT_WRITABLE_PATH: &str = "/tmp";

/// A validated, fully resolved description of the instance to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Instance name.
    pub name: InstanceName,
    /// Image reference, defaulted when blank.
    pub image: String,
    /// Home directory from the image table.
    pub home: Utf8PathBuf,
    /// Resolved copy-in sources.
    pub copy_sources: Vec<Utf8PathBuf>,
    /// Resolved bind mounts.
    pub mounts: Vec<ResolvedMount>,
    /// tmpfs paths kept writable.
    pub writable_paths: Vec<String>,
    /// Resource limits.
    pub limits: ResourceLimits,
    /// Isolation switches.
    pub security: SecurityOptions,
    /// User for processes in the instance.
    pub user: String,
    /// Whether the package cache volume is mounted.
    pub cache_packages: bool,
}

impl LaunchPlan {
    /// Resolve and validate `config` for the instance `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PathNotFound`] for a missing copy or mount
    /// source and [`SessionError::InvalidMount`] for a relative container path.
    pub fn prepare(
        config: &SessionConfig,
        name: InstanceName,
        resolver: &PathResolver,
    ) -> Result<Self, SessionError> {
        let image = String::from(effective_image(&config.image));
        let home = default_home(&image);

        let copy_sources = config
            .copy_paths
            .iter()
            .map(|raw| resolver.resolve_existing(raw, COPY_ROLE))
            .collect::<Result<Vec<_>, _>>()?;
        let mounts = config
            .mounts
            .iter()
            .map(|raw| resolver.resolve_mount(raw, &home))
            .collect::<Result<Vec<_>, _>>()?;

        let mut writable_paths = config.writable_paths.clone();
        if config.security.read_only_root && writable_paths.is_empty() {
            writable_paths.push(String::from(DEFAULT_WRITABLE_PATH));
        }

        Ok(Self {
            name,
            image,
            home,
            copy_sources,
            mounts,
            writable_paths,
            limits: config.limits.clone(),
            security: config.security,
            user: config.user.clone(),
            cache_packages: config.cache_packages,
        })
    }

    /// Container directory the package cache volume is mounted at.
    #[must_use]
    pub fn package_cache_dir(&self) -> Utf8PathBuf {
        self.home.join(".cache/Homebrew")
    }
}
