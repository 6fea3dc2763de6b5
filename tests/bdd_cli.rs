//! Behavioural tests for the lazylab CLI.
//!
//! These tests validate the command-line interface behaviour using rstest-bdd.

#![expect(clippy::expect_used, reason = "expect is standard practice in tests")]

use clap::Parser;
use clap::error::ErrorKind;
use lazylab::config::{Cli, Commands, ProfileCommand, SessionConfig};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then};

/// State shared across CLI test scenarios.
#[derive(Default, ScenarioState)]
struct CliState {
    /// The output from rendering help or version text.
    output: Slot<String>,
    /// Any error message from the CLI.
    error: Slot<String>,
    /// The profile subcommand that was selected, if any.
    profile_command: Slot<String>,
    /// The session override layer built from the flags.
    session: Slot<SessionConfig>,
}

/// Fixture providing a fresh CLI state.
#[fixture]
fn cli_state() -> CliState {
    CliState::default()
}

fn describe(command: Option<&Commands>) -> String {
    match command {
        None => String::from("session"),
        Some(Commands::Profile(profile)) => match profile {
            ProfileCommand::Save(args) => format!("save {}", args.name),
            ProfileCommand::List => String::from("list"),
            ProfileCommand::Run(args) => format!("run {}", args.name),
            ProfileCommand::Delete(args) => format!("delete {}", args.name),
            ProfileCommand::Edit(args) => format!("edit {}", args.name),
        },
    }
}

// Step definitions

#[given("the CLI is invoked with {arguments}")]
fn invoke_with(cli_state: &CliState, arguments: String) {
    let argv = std::iter::once("lazylab").chain(arguments.split_whitespace());
    match Cli::try_parse_from(argv) {
        Ok(cli) => {
            cli_state.profile_command.set(describe(cli.command.as_ref()));
            cli_state.session.set(cli.session.to_session_config());
        }
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            cli_state.output.set(e.to_string());
        }
        Err(e) => cli_state.error.set(e.to_string()),
    }
}

#[then("the output contains {text}")]
fn output_contains(cli_state: &CliState, text: String) {
    let output = cli_state
        .output
        .get()
        .expect("output should be set before checking");
    assert!(
        output.contains(&text),
        "Expected output to contain '{text}', but got:\n{output}"
    );
}

#[then("an error mentions {text}")]
fn error_mentions(cli_state: &CliState, text: String) {
    let error = cli_state
        .error
        .get()
        .expect("an error should have been returned");
    assert!(
        error.contains(&text),
        "Expected error to mention '{text}', but got:\n{error}"
    );
}

#[then("the selected command is {expected}")]
fn selected_command(cli_state: &CliState, expected: String) {
    let command = cli_state
        .profile_command
        .get()
        .expect("the CLI should have parsed");
    assert_eq!(command, expected);
}

#[then("the packages are {expected}")]
fn packages_are(cli_state: &CliState, expected: String) {
    let session = cli_state.session.get().expect("the CLI should have parsed");
    assert_eq!(session.packages.join(","), expected);
}

#[then("the network is disabled")]
fn network_disabled(cli_state: &CliState) {
    let session = cli_state.session.get().expect("the CLI should have parsed");
    assert!(!session.network_enabled(), "Expected --no-net to disable networking");
}

#[then("the pids limit is {limit}")]
fn pids_limit_is(cli_state: &CliState, limit: u32) {
    let session = cli_state.session.get().expect("the CLI should have parsed");
    assert_eq!(session.limits.pids, limit);
}

// Scenario bindings

#[scenario(path = "tests/features/cli.feature", name = "Display help information")]
fn display_help(cli_state: CliState) {
    let _ = cli_state;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Display version information"
)]
fn display_version(cli_state: CliState) {
    let _ = cli_state;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Session flags accept comma-separated and repeated lists"
)]
fn session_flags_lists(cli_state: CliState) {
    let _ = cli_state;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Profile run accepts override flags after the name"
)]
fn profile_run_overrides(cli_state: CliState) {
    let _ = cli_state;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Profile save requires a name"
)]
fn profile_save_requires_name(cli_state: CliState) {
    let _ = cli_state;
}

#[scenario(
    path = "tests/features/cli.feature",
    name = "Pids limit must be a number"
)]
fn pids_limit_must_be_number(cli_state: CliState) {
    let _ = cli_state;
}
