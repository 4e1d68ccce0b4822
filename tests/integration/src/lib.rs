//! Integration test utilities for the huddle server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API with the in-memory store.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
