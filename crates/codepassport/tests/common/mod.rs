//! Shared test utilities for codepassport integration tests.
//!
//! - `TestHarness` wires a worker to an in-memory store behind a `FlakyStore`
//! - builders create projects and passport requests without boilerplate

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FlakyStore, TestHarness};
