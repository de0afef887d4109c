//! Integration tests for envstrap
//!
//! These tests spawn the actual binary and test end-to-end behavior against
//! fake tool chains written as shell scripts.

mod cli_tests;
#[cfg(unix)]
mod plan_command;
#[cfg(unix)]
mod support;
