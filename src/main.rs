//! `lazylab` application entry point.
//!
//! This binary runs throwaway analysis containers. It uses `eyre` for opaque
//! error handling at the application boundary, converting domain-specific
//! errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/lazylab/config.toml` or path from `LAZYLAB_CONFIG_PATH`)
//! 3. Environment variables (`LAZYLAB_*`)
//! 4. Command-line arguments

use std::io::IsTerminal;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use lazylab::api::{
    self, CommandOutcome, EditParams, SessionParams, delete_profile, edit_profile, list_profiles,
    save_profile,
};
use lazylab::config::{AppConfig, Cli, Commands, ProfileCommand, load_config};
use lazylab::error::Result as LazylabResult;
use mockable::DefaultEnv;
use tokio::runtime::Handle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Application entry point.
///
/// Loads configuration with layered precedence via `OrthoConfig`, then
/// dispatches to the appropriate command handler on a Tokio runtime.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.session.verbose);

    let config = load_config(&cli).map_err(Report::from)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Report::from)?;

    let outcome = run(&cli, &config, runtime.handle()).map_err(Report::from)?;
    drop(runtime);

    if let CommandOutcome::CommandExit { code } = outcome {
        std::process::exit(i32::try_from(code).unwrap_or(1));
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "lazylab=debug" } else { "lazylab=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &AppConfig, handle: &Handle) -> LazylabResult<CommandOutcome> {
    let env = DefaultEnv::new();
    let flags = cli.session.to_session_config();

    match &cli.command {
        None => run_session(cli, config, handle, cli.session.profile.as_deref()),
        Some(Commands::Profile(ProfileCommand::Run(args))) => {
            run_session(cli, config, handle, Some(args.name.as_str()))
        }
        Some(Commands::Profile(ProfileCommand::Save(args))) => {
            let path = save_profile(config, &env, &args.name, &flags)?;
            report(&format!("Saved profile {} ({path})", args.name));
            Ok(CommandOutcome::Success)
        }
        Some(Commands::Profile(ProfileCommand::List)) => {
            for name in list_profiles(config, &env)? {
                report(&name);
            }
            Ok(CommandOutcome::Success)
        }
        Some(Commands::Profile(ProfileCommand::Delete(args))) => {
            delete_profile(config, &env, &args.name)?;
            report(&format!("Deleted profile {}", args.name));
            Ok(CommandOutcome::Success)
        }
        Some(Commands::Profile(ProfileCommand::Edit(args))) => edit_profile(EditParams {
            config,
            name: &args.name,
            editor: args.editor.as_deref(),
            env: &env,
        }),
    }
}

fn run_session(
    cli: &Cli,
    config: &AppConfig,
    handle: &Handle,
    profile: Option<&str>,
) -> LazylabResult<CommandOutcome> {
    let env = DefaultEnv::new();
    api::run_session(SessionParams {
        config,
        overrides: cli.session.to_session_config(),
        profile,
        tty: std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
        runtime_handle: handle,
        env: &env,
    })
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn report(line: &str) {
    println!("{line}");
}
