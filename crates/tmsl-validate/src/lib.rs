//! Structural validation of tabular model definitions.
//!
//! The entry point is [`validate`], which repairs and parses raw
//! definition text, classifies the payload ([`classify`]), and applies
//! the rule set for its shape and storage mode. The outcome is always a
//! [`ValidationResult`](tmsl_model::ValidationResult): errors gate
//! deployment, warnings and suggestions never do.

pub mod classify;
pub mod validator;

pub use classify::{classify, classify_table};
pub use validator::validate;
