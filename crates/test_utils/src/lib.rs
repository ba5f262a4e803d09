//! Test Utilities Crate
//!
//! Shared test infrastructure for the claim workflow test suite.
//!
//! # Modules
//!
//! - `fixtures`: Actors per role and a harness that drives a claim to a given point
//! - `builders`: Builder patterns for service inputs and classifier snapshots
//! - `assertions`: Assertion helpers for workflow outcomes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
