//! Configuration loading with layered precedence.
//!
//! Layers are composed manually through `MergeComposer` (lowest to highest):
//! application defaults, configuration file, environment variables,
//! command-line arguments.
//!
//! The `Cli` struct owns subcommand dispatch and the session flags, so the
//! derive-generated `load()` cannot be used directly. Only `--engine` and
//! `--image` reach the CLI layer of `AppConfig`; every other session flag is
//! merged later through [`SessionConfig::merge`](crate::config::SessionConfig::merge).
//!
//! # Environment Variable Handling
//!
//! Typed variables fail fast: `LAZYLAB_SESSION_STOP_TIMEOUT_SECS=soon` is an
//! error rather than a silent fallback to the default. String variables are
//! always accepted.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Specification for a single environment variable mapping.
struct EnvVarSpec {
    /// The environment variable name (e.g., `LAZYLAB_ENGINE`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["session", "shell"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

/// Table of all environment variables and their JSON paths.
const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "LAZYLAB_ENGINE",
        path: &["engine"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LAZYLAB_IMAGE",
        path: &["image"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LAZYLAB_SESSION_NAME_PREFIX",
        path: &["session", "name_prefix"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LAZYLAB_SESSION_SHELL",
        path: &["session", "shell"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LAZYLAB_SESSION_STOP_TIMEOUT_SECS",
        path: &["session", "stop_timeout_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "LAZYLAB_PROFILES_DIR",
        path: &["profiles", "dir"],
        var_type: EnvVarType::String,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `LAZYLAB_*` variable without keeping a
/// second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Read a TOML configuration file through `cap_std` and push it to the composer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Load configuration with full layer precedence.
///
/// 1. Application defaults defined in the struct
/// 2. Configuration file (`--config`, `LAZYLAB_CONFIG_PATH`, `.lazylab.toml`,
///    or `~/.config/lazylab/config.toml`)
/// 3. Environment variables prefixed with `LAZYLAB_`
/// 4. Command-line arguments (`--engine`, `--image`)
///
/// # Errors
///
/// Returns `ConfigError` if an explicitly requested file is missing, a file is
/// malformed, a typed environment variable cannot be parsed, or the merged
/// layers fail to deserialise.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = resolve_config_path(cli)? {
        load_config_file(&path, &mut composer)?;
    }

    let env_values = collect_env_vars()?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;

    Ok(config)
}

/// Pick the configuration file: an explicit `--config` must exist, otherwise
/// the first discovered candidate wins.
fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = cli.config.clone() {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.into_std_path_buf(),
            }
            .into());
        }
        return Ok(Some(path));
    }

    let discovery = ConfigDiscovery::builder("lazylab")
        .env_var("LAZYLAB_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".lazylab.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Collect `LAZYLAB_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed variable has an
/// unparseable value.
fn collect_env_vars() -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Ok(raw_value) = std::env::var(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::U64 => match raw_value.trim().parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

/// Insert a value at a nested path in a JSON map, creating parents as needed.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> serde_json::Value {
    let mut overrides = serde_json::Map::new();

    if let Some(ref engine) = cli.engine {
        overrides.insert(
            "engine".to_owned(),
            serde_json::Value::String(engine.clone()),
        );
    }

    if let Some(ref image) = cli.session.image {
        overrides.insert("image".to_owned(), serde_json::Value::String(image.clone()));
    }

    if overrides.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::Value::Object(overrides)
    }
}
