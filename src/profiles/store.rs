//! File-backed profile storage.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use super::Profile;
use crate::config::AppConfig;
use crate::error::{FilesystemError, ProfileError, Result as LazylabResult};

/// Profile directory relative to the home directory.
const HOME_PROFILE_DIR: &str = ".lazylab/profiles";

const PROFILE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[cfg(unix)]
const PROFILE_FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(file_name: &str) -> Self {
        if Utf8Path::new(file_name).extension() == Some("json") {
            Self::Json
        } else {
            Self::Yaml
        }
    }

    fn encode(self, name: &str, profile: &Profile) -> Result<String, ProfileError> {
        let encoded = match self {
            Self::Json => serde_json::to_string_pretty(profile)
                .map(|text| format!("{text}\n"))
                .map_err(|err| err.to_string()),
            Self::Yaml => serde_yaml::to_string(profile).map_err(|err| err.to_string()),
        };
        encoded.map_err(|message| ProfileError::Format {
            name: String::from(name),
            message,
        })
    }

    fn decode(self, name: &str, text: &str) -> Result<Profile, ProfileError> {
        let decoded = match self {
            Self::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
        };
        decoded.map_err(|message| ProfileError::Format {
            name: String::from(name),
            message,
        })
    }
}

/// Named profiles stored as YAML or JSON files in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStore {
    root: Utf8PathBuf,
}

impl ProfileStore {
    /// Use `root` as the profile directory. It is created on first save.
    #[must_use]
    pub const fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Locate the store from `[profiles] dir`, else `$HOME/.lazylab/profiles`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::HomeUnavailable`] when no directory is
    /// configured and `HOME` is unset or empty.
    pub fn resolve<E: mockable::Env>(config: &AppConfig, env: &E) -> Result<Self, ProfileError> {
        if let Some(dir) = config
            .profiles
            .dir
            .as_ref()
            .filter(|dir| !dir.as_str().trim().is_empty())
        {
            return Ok(Self::new(dir.clone()));
        }
        env.string("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| Self::new(Utf8PathBuf::from(home).join(HOME_PROFILE_DIR)))
            .ok_or(ProfileError::HomeUnavailable)
    }

    /// The profile directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Reject names that are empty or could leave the profile directory.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`] for an empty name or one
    /// containing `/` or `..`.
    pub fn sanitize(name: &str) -> Result<&str, ProfileError> {
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(ProfileError::InvalidName {
                name: String::from(name),
            });
        }
        Ok(name)
    }

    /// The file a save under `name` writes to.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`] when `name` fails [`Self::sanitize`].
    pub fn path_for(&self, name: &str) -> Result<Utf8PathBuf, ProfileError> {
        let checked = Self::sanitize(name)?;
        Ok(self.root.join(file_name_for(checked)))
    }

    /// The existing file for `name`, or where a save would put it.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`] when `name` fails [`Self::sanitize`].
    pub fn locate(&self, name: &str) -> Result<Utf8PathBuf, ProfileError> {
        let checked = Self::sanitize(name)?;
        let existing = candidates(checked)
            .into_iter()
            .map(|candidate| self.root.join(candidate))
            .find(|path| path.is_file());
        match existing {
            Some(path) => Ok(path),
            None => self.path_for(checked),
        }
    }

    /// Write `profile` under `name`, replacing any previous file atomically.
    ///
    /// The format is JSON when `name` ends in `.json` and YAML otherwise. The
    /// file is readable by the owner only.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] for an invalid name or encoding failure and
    /// a [`FilesystemError`] when the directory or file cannot be written.
    pub fn save(&self, name: &str, profile: &Profile) -> LazylabResult<Utf8PathBuf> {
        let file_name = file_name_for(Self::sanitize(name)?);
        let contents = Format::of(&file_name).encode(name, profile)?;

        Dir::create_ambient_dir_all(&self.root, ambient_authority())
            .map_err(|err| fs_error(&self.root, &err))?;
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority())
            .map_err(|err| fs_error(&self.root, &err))?;

        let staging = format!("{file_name}.tmp");
        write_private(&dir, &staging, &contents)
            .map_err(|err| fs_error(&self.root.join(&staging), &err))?;
        let path = self.root.join(&file_name);
        dir.rename(&staging, &dir, &file_name)
            .map_err(|err| fs_error(&path, &err))?;
        debug!(%path, "profile saved");
        Ok(path)
    }

    /// Read the profile saved under `name`.
    ///
    /// Without an extension, `<name>.json` is tried before `<name>.yaml` and
    /// `<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when no file exists,
    /// [`ProfileError::Format`] when it cannot be decoded, or a
    /// [`FilesystemError`] when it cannot be read.
    pub fn load(&self, name: &str) -> LazylabResult<Profile> {
        let checked = Self::sanitize(name)?;
        let Some(dir) = self.open_existing()? else {
            return Err(not_found(name).into());
        };
        for candidate in candidates(checked) {
            match dir.read_to_string(&candidate) {
                Ok(text) => {
                    debug!(file = %candidate, "profile loaded");
                    return Ok(Format::of(&candidate).decode(name, &text)?);
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(fs_error(&self.root.join(&candidate), &err).into()),
            }
        }
        Err(not_found(name).into())
    }

    /// Remove every file stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when nothing was removed, or a
    /// [`FilesystemError`] when a file cannot be removed.
    pub fn delete(&self, name: &str) -> LazylabResult<()> {
        let checked = Self::sanitize(name)?;
        let Some(dir) = self.open_existing()? else {
            return Err(not_found(name).into());
        };
        let mut removed = 0_usize;
        for candidate in candidates(checked) {
            match dir.remove_file(&candidate) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(fs_error(&self.root.join(&candidate), &err).into()),
            }
        }
        if removed == 0 {
            return Err(not_found(name).into());
        }
        Ok(())
    }

    /// Names of all stored profiles, without extensions, sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`FilesystemError`] when the directory cannot be read. A
    /// missing directory yields an empty list.
    pub fn list(&self) -> LazylabResult<Vec<String>> {
        let Some(dir) = self.open_existing()? else {
            return Ok(Vec::new());
        };
        let entries = dir.entries().map_err(|err| fs_error(&self.root, &err))?;
        let mut names = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|err| fs_error(&self.root, &err))?;
            let is_file = entry
                .file_type()
                .map_err(|err| fs_error(&self.root, &err))?
                .is_file();
            if !is_file {
                continue;
            }
            let Ok(file_name) = entry.file_name() else {
                continue;
            };
            if let Some(stem) = profile_stem(&file_name) {
                names.push(stem);
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn open_existing(&self) -> Result<Option<Dir>, FilesystemError> {
        match Dir::open_ambient_dir(&self.root, ambient_authority()) {
            Ok(dir) => Ok(Some(dir)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(fs_error(&self.root, &err)),
        }
    }
}

fn explicit_extension(name: &str) -> Option<&str> {
    Utf8Path::new(name)
        .extension()
        .filter(|ext| PROFILE_EXTENSIONS.contains(ext))
}

fn file_name_for(name: &str) -> String {
    if explicit_extension(name).is_some() {
        String::from(name)
    } else {
        format!("{name}.yaml")
    }
}

fn candidates(name: &str) -> Vec<String> {
    if explicit_extension(name).is_some() {
        return vec![String::from(name)];
    }
    PROFILE_EXTENSIONS
        .iter()
        .map(|ext| format!("{name}.{ext}"))
        .collect()
}

fn profile_stem(file_name: &str) -> Option<String> {
    let path = Utf8Path::new(file_name);
    explicit_extension(file_name)?;
    path.file_stem().map(String::from)
}

fn not_found(name: &str) -> ProfileError {
    ProfileError::NotFound {
        name: String::from(name),
    }
}

/// Create `file_name` with owner-only permissions, then fill it.
fn write_private(dir: &Dir, file_name: &str, contents: &str) -> io::Result<()> {
    dir.write(file_name, "")?;
    #[cfg(unix)]
    {
        use cap_std::fs::PermissionsExt;
        dir.set_permissions(
            file_name,
            cap_std::fs::Permissions::from_mode(PROFILE_FILE_MODE),
        )?;
    }
    dir.write(file_name, contents)
}

fn fs_error(path: &Utf8Path, err: &io::Error) -> FilesystemError {
    let std_path = path.as_std_path().to_path_buf();
    match err.kind() {
        io::ErrorKind::NotFound => FilesystemError::NotFound { path: std_path },
        io::ErrorKind::PermissionDenied => FilesystemError::PermissionDenied { path: std_path },
        _ => FilesystemError::IoError {
            path: std_path,
            message: err.to_string(),
        },
    }
}
