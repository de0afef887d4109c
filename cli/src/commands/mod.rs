//! Command implementations

pub mod plan;
pub mod run;
pub mod version;
