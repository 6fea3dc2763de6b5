//! Instance name validation, generation and collision checks.

use std::fmt;
use std::sync::LazyLock;

use chrono::Local;
use rand::Rng;
use regex::Regex;
use tracing::debug;

use super::invoker::{EngineRunner, argv};
use crate::config::DEFAULT_NAME_PREFIX;
use crate::error::SessionError;

/// Identifier grammar accepted by docker-compatible engines.
static NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]+$").ok());

/// A validated container instance name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceName(String);

impl InstanceName {
    /// Validate `name` against the identifier grammar.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidName`] when the name is shorter than two
    /// characters, starts with something other than an ASCII letter or digit,
    /// or contains characters outside `[A-Za-z0-9_.-]`.
    pub fn parse(name: &str) -> Result<Self, SessionError> {
        validate(name)?;
        Ok(Self(String::from(name)))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check `name` against the identifier grammar.
///
/// # Errors
///
/// Returns [`SessionError::InvalidName`] when the name does not match.
pub fn validate(name: &str) -> Result<(), SessionError> {
    let valid = NAME_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name));
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidName {
            name: String::from(name),
        })
    }
}

/// Generate `<prefix>-<YYYYMMDDhhmmss>-<NNNNN>` from the local clock.
///
/// Characters the grammar forbids are replaced with `-`, leading separators
/// are stripped, and an empty prefix falls back to `lazylab`.
#[must_use]
pub fn generate(prefix: &str) -> InstanceName {
    let stem = sanitise_prefix(prefix);
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let suffix: u32 = rand::rng().random_range(0..100_000);
    InstanceName(format!("{stem}-{timestamp}-{suffix:05}"))
}

fn sanitise_prefix(prefix: &str) -> String {
    let replaced: String = prefix
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let stem = replaced.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
    if stem.is_empty() {
        String::from(DEFAULT_NAME_PREFIX)
    } else {
        String::from(stem)
    }
}

/// Return whether any instance, running or stopped, already uses `name`.
///
/// A listing failure counts as "no match"; creation then fails loudly if the
/// name really is taken.
pub async fn exists<E: EngineRunner + ?Sized>(engine: &E, name: &InstanceName) -> bool {
    match engine
        .capture(argv(["ps", "-a", "--format", "{{.Names}}"]))
        .await
    {
        Ok(listing) => listing.lines().any(|line| line.trim() == name.as_str()),
        Err(err) => {
            debug!(error = %err, "instance listing failed; assuming name is free");
            false
        }
    }
}
