//! Shared fixtures and helper functions for config tests.

use crate::config::{
    AppConfig, DEFAULT_NAME_PREFIX, DEFAULT_SHELL, DEFAULT_STOP_TIMEOUT_SECS, ResourceLimits,
    SessionConfig,
};
use ortho_config::MergeComposer;
use rstest::fixture;
use std::sync::Arc;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        engine = "podman"
        image = "ghcr.io/example/analysis:latest"

        [session]
        name_prefix = "triage"
        shell = "bash"
        stop_timeout_secs = 30

        [profiles]
        dir = "/srv/lazylab/profiles"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a session with both CPU and memory limits set.
#[fixture]
pub fn limited_session() -> SessionConfig {
    SessionConfig {
        image: String::from("homebrew/brew:latest"),
        packages: vec![String::from("radare2")],
        limits: ResourceLimits {
            memory: String::from("2g"),
            cpus: String::from("2"),
            pids: 256,
        },
        ..SessionConfig::default()
    }
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.engine.is_none(), "engine should be None");
    assert_eq!(config.engine_command(), "docker");
    assert!(config.image.is_none(), "image should be None");
    assert_eq!(config.session.name_prefix, DEFAULT_NAME_PREFIX);
    assert_eq!(config.session.shell, DEFAULT_SHELL);
    assert_eq!(config.session.stop_timeout_secs, DEFAULT_STOP_TIMEOUT_SECS);
    assert!(config.profiles.dir.is_none(), "profiles.dir should be None");
}

/// Helper: Creates a `MergeComposer` with defaults, file, and env layers for testing layer precedence.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    use ortho_config::serde_json::json;

    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "engine": "podman",
            "image": "file-image:latest"
        }),
        None,
    );

    composer.push_environment(json!({
        "engine": "/usr/local/bin/docker"
    }));

    Ok(composer)
}
