//! Writable-path creation and copy-in of host material.

use tracing::debug;

use crate::engine::{
    CapabilityProber, EngineRunner, IoDiscipline, Policy, argv, best_effort, run_step,
    shell_quote,
};
use crate::error::SessionError;
use crate::launch::{LaunchPlan, default_container_path};

/// Create each writable path as root. Failures are warnings.
pub(crate) async fn create_writable_paths<E: EngineRunner + ?Sized>(engine: &E, plan: &LaunchPlan) {
    let name = plan.name.as_str();
    for path in &plan.writable_paths {
        best_effort(
            engine,
            argv(["exec", "-u", "0", name, "mkdir", "-p", path.as_str()]),
            IoDiscipline::Inherit,
            "creating writable path",
        )
        .await;
    }
}

/// Copy every copy-in source into the instance home and make it read-only.
///
/// The home directory is asked of the instance once; the image-table home is
/// used when that probe fails.
///
/// # Errors
///
/// Returns [`SessionError::CopyFailed`] for the first source the engine
/// fails to copy. Marking a copy read-only is best-effort.
pub(crate) async fn copy_sources<E: EngineRunner + ?Sized>(
    engine: &E,
    plan: &LaunchPlan,
    prober: &CapabilityProber<'_, E>,
) -> Result<(), SessionError> {
    if plan.copy_sources.is_empty() {
        return Ok(());
    }

    let home = match prober.home_directory().await {
        Some(home) => home,
        None => {
            debug!(fallback = %plan.home, "home probe failed; using image default");
            plan.home.clone()
        }
    };
    let name = plan.name.as_str();

    for source in &plan.copy_sources {
        let destination = format!("{name}:{home}");
        run_step(
            engine,
            argv(["cp", source.as_str(), destination.as_str()]),
            IoDiscipline::Inherit,
            Policy::Required,
            "copying into instance",
        )
        .await
        .map_err(|err| SessionError::CopyFailed {
            container: String::from(name),
            path: source.clone().into_std_path_buf(),
            message: err.to_string(),
        })?;

        let copied = default_container_path(source, &home);
        let chmod = format!("chmod -R a-w {}", shell_quote(copied.as_str()));
        best_effort(
            engine,
            argv(["exec", "-u", "0", name, "sh", "-c", chmod.as_str()]),
            IoDiscipline::Inherit,
            "marking copy read-only",
        )
        .await;
    }
    Ok(())
}
