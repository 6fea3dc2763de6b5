//! Profile management commands.

use std::process::Command;

use camino::Utf8PathBuf;
use tracing::debug;

use crate::config::{AppConfig, SessionConfig};
use crate::error::{ProfileError, Result as LazylabResult};
use crate::profiles::{Profile, ProfileStore};

use super::CommandOutcome;

/// Save the given flags under `name`. Returns the file written.
///
/// # Errors
///
/// Returns profile store errors for an invalid name or a failed write.
pub fn save_profile<E: mockable::Env>(
    config: &AppConfig,
    env: &E,
    name: &str,
    flags: &SessionConfig,
) -> LazylabResult<Utf8PathBuf> {
    let store = ProfileStore::resolve(config, env)?;
    store.save(name, &Profile::from_session(name, flags))
}

/// Names of all saved profiles, sorted.
///
/// # Errors
///
/// Returns profile store errors when the directory cannot be read.
pub fn list_profiles<E: mockable::Env>(config: &AppConfig, env: &E) -> LazylabResult<Vec<String>> {
    ProfileStore::resolve(config, env)?.list()
}

/// Delete the profile saved under `name`.
///
/// # Errors
///
/// Returns `ProfileError::NotFound` when no such profile exists.
pub fn delete_profile<E: mockable::Env>(
    config: &AppConfig,
    env: &E,
    name: &str,
) -> LazylabResult<()> {
    ProfileStore::resolve(config, env)?.delete(name)
}

/// Parameters for [`edit_profile`].
pub struct EditParams<'a, E: mockable::Env> {
    /// Application configuration (provides the profile directory).
    pub config: &'a AppConfig,
    /// Profile to open.
    pub name: &'a str,
    /// Editor given on the command line; falls back to `$EDITOR`.
    pub editor: Option<&'a str>,
    /// Environment variable provider.
    pub env: &'a E,
}

/// Open a profile in the user's editor and wait for it to exit.
///
/// # Errors
///
/// Returns `ProfileError::NoEditor` when neither `--editor` nor `$EDITOR` is
/// set, and `ProfileError::EditorFailed` when the editor cannot be started.
pub fn edit_profile<E: mockable::Env>(params: EditParams<'_, E>) -> LazylabResult<CommandOutcome> {
    let EditParams {
        config,
        name,
        editor,
        env,
    } = params;

    let editor_command = resolve_editor(editor, env)?;
    let path = ProfileStore::resolve(config, env)?.locate(name)?;
    let mut words = editor_command.split_whitespace();
    let Some(program) = words.next() else {
        return Err(ProfileError::NoEditor.into());
    };

    debug!(editor = %editor_command, %path, "opening profile in editor");
    let status = Command::new(program)
        .args(words)
        .arg(path.as_std_path())
        .status()
        .map_err(|err| ProfileError::EditorFailed {
            editor: editor_command.clone(),
            message: err.to_string(),
        })?;

    if status.success() {
        Ok(CommandOutcome::Success)
    } else {
        Ok(CommandOutcome::CommandExit {
            code: status.code().map_or(1, i64::from),
        })
    }
}

/// The editor from `--editor`, else `$EDITOR`. Blank values count as unset.
pub(super) fn resolve_editor<E: mockable::Env>(
    flag: Option<&str>,
    env: &E,
) -> Result<String, ProfileError> {
    flag.map(str::trim)
        .filter(|editor| !editor.is_empty())
        .map(String::from)
        .or_else(|| {
            env.string("EDITOR")
                .map(|editor| String::from(editor.trim()))
                .filter(|editor| !editor.is_empty())
        })
        .ok_or(ProfileError::NoEditor)
}
