//! Configuration data types for lazylab.

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Container engine command used when none is configured.
pub const DEFAULT_ENGINE: &str = "docker";

/// Prefix for generated instance names.
pub const DEFAULT_NAME_PREFIX: &str = "lazylab";

/// Shell preferred when the user names none.
pub const DEFAULT_SHELL: &str = "fish";

/// Seconds granted to a graceful stop before the engine kills the instance.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

/// Defaults applied to every session before profiles and flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct SessionDefaults {
    /// Prefix for generated instance names.
    #[default(String::from(DEFAULT_NAME_PREFIX))]
    pub name_prefix: String,

    /// Shell to try first when attaching.
    #[default(String::from(DEFAULT_SHELL))]
    pub shell: String,

    /// Graceful-stop window in seconds.
    #[default(DEFAULT_STOP_TIMEOUT_SECS)]
    pub stop_timeout_secs: u64,
}

/// Profile store configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Directory holding profile files. Defaults to `~/.lazylab/profiles`.
    pub dir: Option<Utf8PathBuf>,
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `LAZYLAB_CONFIG_PATH` environment variable
/// 2. `.lazylab.toml` in the current working directory
/// 3. `.lazylab.toml` in the home directory
/// 4. `~/.config/lazylab/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "LAZYLAB",
    post_merge_hook,
    discovery(
        app_name = "lazylab",
        env_var = "LAZYLAB_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".lazylab.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// The container engine command (`docker`, `podman`, or a path).
    pub engine: Option<String>,

    /// The default container image for sessions.
    pub image: Option<String>,

    /// Session defaults.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub session: SessionDefaults,

    /// Profile store configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub profiles: ProfilesConfig,
}

impl AppConfig {
    /// Return the engine command, falling back to [`DEFAULT_ENGINE`].
    #[must_use]
    pub fn engine_command(&self) -> &str {
        self.engine
            .as_deref()
            .map(str::trim)
            .filter(|engine| !engine.is_empty())
            .unwrap_or(DEFAULT_ENGINE)
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank strings from env or file mean "unset".
        self.engine = self.engine.take().filter(|value| !value.trim().is_empty());
        self.image = self.image.take().filter(|value| !value.trim().is_empty());
        Ok(())
    }
}
