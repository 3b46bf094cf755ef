//! Best-effort normalization of tabular model definition text.
//!
//! `normalize` is the single entry point the rest of the workspace runs
//! input through before validating or analyzing it. The pipeline is a
//! fixed order of repair steps followed by canonical formatting:
//!
//! 1. text repair ([`repair::clean_text`]): line endings, outer quote
//!    layers, stray escape sequences;
//! 2. parse; text that still fails to parse is returned cleaned but
//!    otherwise unchanged;
//! 3. canonical ordering and tidying ([`canonical::canonicalize`]);
//! 4. pretty serialization with sorted object keys and 2-space indent.
//!
//! Normalized output is a fixed point: feeding it back through
//! `normalize` reproduces it byte for byte.

pub mod canonical;
pub mod repair;

pub use canonical::canonicalize;
pub use repair::clean_text;

use serde_json::Value;
use tracing::debug;

/// Normalize raw definition text. Never fails; unparseable input comes
/// back cleaned so the caller can report the parse error against it.
pub fn normalize(raw: &str) -> String {
    let cleaned = repair::clean_text(raw);
    let mut value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(error) => {
            debug!(%error, "definition text not parseable after repair");
            return cleaned;
        }
    };
    canonical::canonicalize(&mut value);
    match serde_json::to_string_pretty(&value) {
        Ok(text) => text,
        Err(_) => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSY: &str = "{\r\n  \"createOrReplace\": {\"database\": {\"model\": {\r\n    \"tables\": [\r\n      {\"name\": \"Zeta\"},\r\n      {\"name\": \"Alpha\", \"columns\": [{\"name\": \"Id\", \"dataType\": \"int64\", \"isKey\": \"true\"}]}\r\n    ]\r\n  }}}\r\n}";

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(MESSY);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_is_deterministic_under_reordering() {
        let a = r#"{"model": {"tables": [{"name": "B"}, {"name": "A"}], "relationships": []}}"#;
        let b = r#"{"model": {"relationships": [], "tables": [{"name": "A"}, {"name": "B"}]}}"#;
        assert_eq!(normalize(a), normalize(b));
    }

    #[test]
    fn normalize_applies_repairs_and_tidying() {
        let output = normalize(MESSY);
        assert!(!output.contains('\r'));
        assert!(output.contains("\"dataType\": \"Int64\""));
        assert!(output.contains("\"isKey\": true"));
        // Tables are sorted, so Alpha serializes before Zeta.
        let alpha = output.find("Alpha").expect("Alpha present");
        let zeta = output.find("Zeta").expect("Zeta present");
        assert!(alpha < zeta);
    }

    #[test]
    fn normalize_keeps_unparseable_text() {
        assert_eq!(normalize("not json"), "not json");
    }

    #[test]
    fn normalize_uses_two_space_indent() {
        let output = normalize(r#"{"model": {"tables": []}}"#);
        assert!(output.contains("{\n  \"model\""));
    }
}
