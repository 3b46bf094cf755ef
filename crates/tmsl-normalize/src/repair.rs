//! Text-level repair of damaged definition strings.
//!
//! Definitions arrive through copy/paste, shell quoting, and double JSON
//! encoding, so the raw text is often almost-JSON: Windows line endings,
//! an extra layer of quotes, or escape sequences that belong to an outer
//! encoding. Each repair step below is a no-op when its damage pattern is
//! absent, and text that is already valid JSON skips the invasive steps
//! entirely.

use serde_json::Value;
use tracing::debug;

/// Run the ordered repair steps over raw definition text.
///
/// This never fails. Text that cannot be repaired into valid JSON is
/// returned in its cleaned (line endings, whitespace) form so the caller
/// can attach the parse error to the original content.
pub fn clean_text(raw: &str) -> String {
    let mut cleaned = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string();

    // Already valid: nothing else to repair. A valid JSON *string* is the
    // double-encoded case and still needs unwrapping below.
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::String(_)) | Err(_) => {}
        Ok(_) => return cleaned,
    }

    // A definition wrapped in one more layer of JSON string encoding.
    if cleaned.len() >= 2 && cleaned.starts_with('"') && cleaned.ends_with('"') {
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(Value::String(inner)) => {
                debug!("decoded definition from an outer JSON string layer");
                cleaned = inner;
            }
            Ok(_) => {}
            Err(_) => {
                debug!("stripped unbalanced outer quote layer");
                cleaned = cleaned[1..cleaned.len() - 1].to_string();
            }
        }
        // The unwrapped text is often exact JSON; stop before the escape
        // repairs can damage legitimately escaped content inside it.
        if serde_json::from_str::<Value>(&cleaned).is_ok() {
            return cleaned;
        }
    }

    // Escape sequences left behind by an outer encoding. Quotes and
    // backslashes first, then literal newline/tab sequences.
    cleaned = cleaned.replace("\\\"", "\"").replace("\\\\", "\\");
    cleaned = cleaned.replace("\\n", "\n").replace("\\t", "\t");

    cleaned
}
