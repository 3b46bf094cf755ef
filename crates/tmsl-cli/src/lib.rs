//! CLI library components for the tabular model linter.

pub mod logging;
