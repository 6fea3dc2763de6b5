//! Container engine access through its command-line interface.
//!
//! lazylab is a client of an existing `docker`-compatible CLI (`docker`,
//! `podman`, ...). This module wraps that CLI:
//!
//! - [`invoker`]: subprocess execution with terminal I/O disciplines and
//!   tagged step outcomes
//! - [`naming`]: instance name grammar, generation and collision checks
//! - [`probe`]: shell, package and home-directory probes inside an instance

pub mod invoker;
pub mod naming;
pub mod probe;

#[cfg(test)]
mod tests;

pub use invoker::{
    CliEngine, EngineFuture, EngineRunner, IoDiscipline, Policy, StepOutcome, argv, best_effort,
    run_step,
};
pub use naming::{InstanceName, generate, validate};
pub use probe::{CapabilityProber, shell_quote};
