use serde::{Deserialize, Serialize};

/// Outcome of a structural validation pass.
///
/// `valid` is the deployment gate: it is false exactly when `errors` is
/// non-empty. Warnings and suggestions never block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
