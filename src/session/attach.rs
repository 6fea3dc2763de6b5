//! Shell selection and the interactive attach.

use tracing::warn;

use crate::engine::{CapabilityProber, EngineRunner, InstanceName, IoDiscipline, argv};
use crate::error::SessionError;

const FALLBACK_SHELLS: [&str; 4] = ["fish", "bash", "zsh", "sh"];

/// Preferred shell first, then the fallbacks, without duplicates.
#[must_use]
pub(crate) fn shell_candidates(preferred: &str) -> Vec<&str> {
    let mut candidates: Vec<&str> = Vec::with_capacity(FALLBACK_SHELLS.len() + 1);
    let preferred_shell = preferred.trim();
    if !preferred_shell.is_empty() {
        candidates.push(preferred_shell);
    }
    for shell in FALLBACK_SHELLS {
        if !candidates.contains(&shell) {
            candidates.push(shell);
        }
    }
    candidates
}

/// Attach an interactive shell and wait for it to exit.
///
/// Returns the shell that was started. A non-zero shell exit is logged as a
/// warning; it is the user's exit status, not a session failure.
///
/// # Errors
///
/// Returns [`SessionError::NoShellFound`] when no candidate is available.
pub(crate) async fn attach_shell<E: EngineRunner + ?Sized>(
    engine: &E,
    name: &InstanceName,
    preferred: &str,
    tty: bool,
    prober: &mut CapabilityProber<'_, E>,
) -> Result<String, SessionError> {
    let candidates = shell_candidates(preferred);
    let mut chosen = None;
    for candidate in &candidates {
        if prober.has_executable(candidate).await {
            chosen = Some(String::from(*candidate));
            break;
        }
    }
    let Some(shell) = chosen else {
        return Err(SessionError::NoShellFound {
            container: String::from(name.as_str()),
            tried: candidates.join(", "),
        });
    };

    let interactive = if tty { "-it" } else { "-i" };
    if let Err(err) = engine
        .run(
            argv(["exec", interactive, name.as_str(), shell.as_str()]),
            IoDiscipline::Attach,
        )
        .await
    {
        warn!(error = %err, shell = %shell, "interactive shell exited unsuccessfully");
    }
    Ok(shell)
}
