use crate::report::SuiteSnapshot;

/// Emit a suite snapshot as YAML.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn emit_yaml(snapshot: &SuiteSnapshot) -> Result<String, String> {
    serde_yaml::to_string(snapshot).map_err(|e| format!("yaml serialization failed: {e}"))
}
