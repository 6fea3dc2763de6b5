//! Unit tests for lazylab configuration types.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and TOML deserialisation of `AppConfig`
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests
//! - [`merge_tests`] - `SessionConfig::merge` override rules
//! - [`cli_tests`] - Session flag parsing and conversion

mod helpers;
