use crate::report::SuiteSnapshot;

/// Emit a suite snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn emit_json(snapshot: &SuiteSnapshot) -> Result<String, String> {
    serde_json::to_string_pretty(snapshot).map_err(|e| format!("json serialization failed: {e}"))
}
