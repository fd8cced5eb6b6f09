//! Dump of the internal tracked-request state (`-vvv`).

use crate::scanner::StreamResult;
use crate::utils::error::OutputError;

/// Serialize every stream's tracked requests as pretty JSON
///
/// # Errors
/// * `OutputError::SerializationFailed` - serde_json refused the value
pub fn dump_state(results: &[StreamResult]) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(results)?)
}
