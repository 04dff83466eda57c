//! Shared helpers for the ranking integration tests.
#![allow(dead_code)]

pub mod fixtures;
pub mod flaky_index;
