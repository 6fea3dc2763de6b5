//! Host path preflight and container-side defaults.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::{FilesystemError, SessionError};

/// Image used when the session names none.
pub const DEFAULT_IMAGE: &str = "homebrew/brew:latest";

/// Image-reference substrings mapped to their default home directory.
const IMAGE_HOMES: &[(&str, &str)] = &[("homebrew/brew", "/home/linuxbrew")];

const FALLBACK_HOME: &str = "/root";

/// Role label used in errors for copy-in sources.
pub const COPY_ROLE: &str = "copy";

/// Role label used in errors for mount sources.
pub const MOUNT_ROLE: &str = "mount host";

/// Return `image`, or [`DEFAULT_IMAGE`] when it is blank.
#[must_use]
pub fn effective_image(image: &str) -> &str {
    let trimmed = image.trim();
    if trimmed.is_empty() {
        DEFAULT_IMAGE
    } else {
        trimmed
    }
}

/// Best-effort home directory for `image`, looked up in the image table.
#[must_use]
pub fn default_home(image: &str) -> Utf8PathBuf {
    let reference = effective_image(image);
    let home = IMAGE_HOMES
        .iter()
        .find(|(pattern, _)| reference.contains(pattern))
        .map_or(FALLBACK_HOME, |(_, home)| home);
    Utf8PathBuf::from(home)
}

/// A parsed `host[:container]` mount specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec<'a> {
    /// Host side, as given.
    pub host: &'a str,
    /// Explicit container side, if one was given.
    pub container: Option<&'a str>,
}

impl<'a> MountSpec<'a> {
    /// Split `raw` on its first `:`. An empty container side counts as absent.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some((host, container)) => Self {
                host,
                container: Some(container).filter(|value| !value.is_empty()),
            },
            None => Self {
                host: raw,
                container: None,
            },
        }
    }
}

/// A bind mount with both sides resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMount {
    /// Absolute, symlink-resolved host path.
    pub host: Utf8PathBuf,
    /// Absolute container path.
    pub container: Utf8PathBuf,
}

/// Resolves host paths against a fixed working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    cwd: Utf8PathBuf,
}

impl PathResolver {
    /// Create a resolver anchored at `cwd`.
    #[must_use]
    pub const fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Create a resolver anchored at the process working directory.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::IoError` when the working directory cannot be
    /// read or is not valid UTF-8.
    pub fn from_current_dir() -> Result<Self, FilesystemError> {
        let cwd = std::env::current_dir().map_err(|err| FilesystemError::IoError {
            path: std::path::PathBuf::from("."),
            message: err.to_string(),
        })?;
        let utf8 = Utf8PathBuf::try_from(cwd).map_err(|err| FilesystemError::IoError {
            path: err.as_path().to_path_buf(),
            message: String::from("working directory is not valid UTF-8"),
        })?;
        Ok(Self::new(utf8))
    }

    /// The directory relative paths are resolved against.
    #[must_use]
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Make `raw` absolute and lexically clean without touching the
    /// filesystem. `.` segments are dropped and `..` removes the preceding
    /// segment.
    #[must_use]
    pub fn absolutise(&self, raw: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(raw);
        if path.is_absolute() {
            lexically_clean(path)
        } else {
            lexically_clean(&self.cwd.join(path))
        }
    }

    /// Resolve `raw` to an absolute, existing host path.
    ///
    /// Symlinks are resolved when possible; the absolute form is kept when
    /// resolution fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PathNotFound`] naming the absolute path when it
    /// is empty or does not exist.
    pub fn resolve_existing(
        &self,
        raw: &str,
        role: &'static str,
    ) -> Result<Utf8PathBuf, SessionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::PathNotFound {
                role,
                path: std::path::PathBuf::new(),
            });
        }
        let absolute = self.absolutise(trimmed);
        if !absolute.exists() {
            return Err(SessionError::PathNotFound {
                role,
                path: absolute.into_std_path_buf(),
            });
        }
        Ok(absolute.canonicalize_utf8().unwrap_or(absolute))
    }

    /// Resolve a `host[:container]` specification.
    ///
    /// Without a container side, the mount lands at `home/<basename>` where
    /// the basename is taken from the resolved host path.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidMount`] for a relative container path
    /// and [`SessionError::PathNotFound`] for a missing host path.
    pub fn resolve_mount(&self, raw: &str, home: &Utf8Path) -> Result<ResolvedMount, SessionError> {
        let spec = MountSpec::parse(raw.trim());
        if let Some(container) = spec.container
            && !container.starts_with('/')
        {
            return Err(SessionError::InvalidMount {
                container_path: String::from(container),
            });
        }

        let host = self.resolve_existing(spec.host, MOUNT_ROLE)?;
        let container = spec
            .container
            .map_or_else(|| default_container_path(&host, home), Utf8PathBuf::from);
        Ok(ResolvedMount { host, container })
    }
}

/// Default container path for a host path: `home/<basename>`, or `home`
/// itself when the host path has no final component.
#[must_use]
pub fn default_container_path(host: &Utf8Path, home: &Utf8Path) -> Utf8PathBuf {
    host.file_name()
        .map_or_else(|| home.to_path_buf(), |base| home.join(base))
}

fn lexically_clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut cleaned = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if cleaned.file_name().is_some() {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push(component);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
