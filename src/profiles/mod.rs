//! Named profiles.
//!
//! A profile is a saved set of session options, kept as one YAML or JSON
//! file per name. `lazylab profile run` and `--profile` load a profile as the
//! base layer and merge command-line flags over it with
//! [`crate::config::SessionConfig::merge`].
//!
//! ```yaml
//! name: triage
//! image: homebrew/brew:latest
//! packages: [radare2, yara]
//! noNet: true
//! readOnly: true
//! writable: [/tmp, /home/linuxbrew/work]
//! ```

mod schema;
mod store;


pub use schema::Profile;
pub use store::ProfileStore;
