//! Rule catalog path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the rule catalog location.
pub const RULES_ENV_VAR: &str = "TMSL_BPA_RULES";

/// Get the rule catalog path.
///
/// Resolution order:
/// 1. `TMSL_BPA_RULES` environment variable
/// 2. `rules/bpa.json` relative to the workspace root
pub fn default_rules_path() -> PathBuf {
    if let Ok(path) = std::env::var(RULES_ENV_VAR) {
        return PathBuf::from(path);
    }
    workspace_rules_path()
}

/// The catalog shipped with the workspace.
pub fn workspace_rules_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../rules/bpa.json")
}
