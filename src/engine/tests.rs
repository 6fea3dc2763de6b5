//! Unit tests for name collision checks and capability probes.

use std::sync::{Arc, Mutex};

use mockall::mock;
use rstest::{fixture, rstest};

use super::*;
use crate::error::SessionError;

mock! {
    #[derive(Debug)]
    Engine {}

    impl EngineRunner for Engine {
        fn run<'a>(
            &'a self,
            args: Vec<String>,
            discipline: IoDiscipline,
        ) -> EngineFuture<'a, Result<(), SessionError>>;

        fn capture<'a>(&'a self, args: Vec<String>) -> EngineFuture<'a, Result<String, SessionError>>;
    }
}

fn failed(command: &str) -> SessionError {
    SessionError::SubprocessFailed {
        command: String::from(command),
        status: String::from("exit status: 1"),
    }
}

/// Engine whose `capture` answers from `respond` and records every argv.
fn capturing_engine<F>(respond: F) -> (MockEngine, Arc<Mutex<Vec<Vec<String>>>>)
where
    F: Fn(&[String]) -> Result<String, SessionError> + Send + 'static,
{
    let mut engine = MockEngine::new();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let calls_for_closure = Arc::clone(&calls);
    engine.expect_capture().returning(move |args| {
        let response = respond(&args);
        calls_for_closure
            .lock()
            .expect("mock capture lock should succeed")
            .push(args);
        Box::pin(async move { response })
    });
    (engine, calls)
}

fn call_count(calls: &Arc<Mutex<Vec<Vec<String>>>>) -> usize {
    calls.lock().expect("mock capture lock should succeed").len()
}

#[fixture]
fn instance() -> InstanceName {
    InstanceName::parse("lab-1").expect("fixture name is valid")
}

#[rstest]
#[tokio::test]
async fn exists_matches_trimmed_listing_lines(instance: InstanceName) {
    let (engine, calls) = capturing_engine(|_| Ok(String::from("other\n  lab-1  \nthird\n")));

    assert!(naming::exists(&engine, &instance).await);

    let recorded = calls.lock().expect("lock").clone();
    assert_eq!(
        recorded,
        vec![argv(["ps", "-a", "--format", "{{.Names}}"])]
    );
}

#[rstest]
#[tokio::test]
async fn exists_requires_an_exact_match(instance: InstanceName) {
    let (engine, _calls) = capturing_engine(|_| Ok(String::from("lab-10\nmy-lab-1\n")));
    assert!(!naming::exists(&engine, &instance).await);
}

#[rstest]
#[tokio::test]
async fn exists_treats_listing_failure_as_free(instance: InstanceName) {
    let (engine, _calls) = capturing_engine(|_| Err(failed("docker ps")));
    assert!(!naming::exists(&engine, &instance).await);
}

#[rstest]
#[tokio::test]
async fn has_executable_caches_positive_results(instance: InstanceName) {
    let (engine, calls) = capturing_engine(|_| Ok(String::new()));
    let mut prober = CapabilityProber::new(&engine, &instance);

    assert!(prober.has_executable("bash").await);
    assert!(prober.has_executable("bash").await);

    assert_eq!(call_count(&calls), 1, "second probe should hit the cache");
    let recorded = calls.lock().expect("lock").clone();
    assert_eq!(
        recorded.first(),
        Some(&argv([
            "exec",
            "lab-1",
            "sh",
            "-lc",
            "command -v 'bash' >/dev/null 2>&1"
        ]))
    );
}

#[rstest]
#[tokio::test]
async fn has_executable_reprobes_negative_results(instance: InstanceName) {
    let (engine, calls) = capturing_engine(|_| Err(failed("docker exec")));
    let mut prober = CapabilityProber::new(&engine, &instance);

    assert!(!prober.has_executable("zsh").await);
    assert!(!prober.has_executable("zsh").await);

    assert_eq!(call_count(&calls), 2);
}

#[rstest]
#[tokio::test]
async fn missing_packages_keeps_only_uninstalled_in_order(instance: InstanceName) {
    let (engine, _calls) = capturing_engine(|args| {
        let script = args.last().map(String::as_str).unwrap_or_default();
        if script.contains("'yara'") {
            Ok(String::new())
        } else {
            Err(failed("docker exec"))
        }
    });
    let prober = CapabilityProber::new(&engine, &instance);

    let missing = prober
        .missing_packages(&argv(["radare2", "yara", "binwalk"]))
        .await;

    assert_eq!(missing, vec!["radare2", "binwalk"]);
}

#[rstest]
#[case(Ok(String::from("/home/linuxbrew")), Some("/home/linuxbrew"))]
#[case(Ok(String::from("  /root\n")), Some("/root"))]
#[case(Ok(String::new()), None)]
#[case(Ok(String::from("relative/home")), None)]
#[case(Err(failed("docker exec")), None)]
#[tokio::test]
async fn home_directory_requires_an_absolute_path(
    instance: InstanceName,
    #[case] response: Result<String, SessionError>,
    #[case] expected: Option<&str>,
) {
    let shared = Arc::new(Mutex::new(Some(response)));
    let (engine, _calls) = capturing_engine(move |_| {
        shared
            .lock()
            .expect("lock")
            .take()
            .expect("home probe should run once")
    });
    let prober = CapabilityProber::new(&engine, &instance);

    let home = prober.home_directory().await;

    assert_eq!(home.as_deref().map(camino::Utf8Path::as_str), expected);
}
