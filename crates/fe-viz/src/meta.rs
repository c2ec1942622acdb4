use std::time::{SystemTime, UNIX_EPOCH};

use fe_core::Result;
use serde::Serialize;

/// Provenance stamped into every artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactMeta {
    /// Producing tool.
    pub tool: String,
    /// Producing tool version.
    pub tool_version: String,
    /// Creation time.
    pub created_unix_ms: u128,
}

impl ArtifactMeta {
    /// Metadata for an artifact created now.
    pub fn now() -> Result<Self> {
        Ok(Self {
            tool: fe_core::TOOL_NAME.to_string(),
            tool_version: fe_core::VERSION.to_string(),
            created_unix_ms: now_unix_ms()?,
        })
    }
}

fn now_unix_ms() -> Result<u128> {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| fe_core::Error::Validation(format!("system time error: {}", e)))?;
    Ok(d.as_millis())
}
