//! Unit tests for envstrap
//!
//! These tests use mocked dependencies and run fast without spawning
//! processes. `architecture` only reads the crate's own sources.

mod manifest_properties;
mod mocks;
