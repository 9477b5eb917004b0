#![forbid(unsafe_code)]
//! Shared primitives for the MCP server catalog tools.
//!
//! Nothing here knows about manifests; the model and sync crates build on
//! these exit codes, error envelopes, canonical JSON writers and the clock
//! port.

pub mod canonical;
pub mod clock;
mod config;

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{env_bool, resolve_harvester_program, DEFAULT_HARVESTER_PROGRAM};

pub const CRATE_NAME: &str = "mcp-catalog-core";

pub const ENV_LOG_LEVEL: &str = "MCP_CATALOG_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "MCP_CATALOG_LOG_JSON";
pub const ENV_HARVESTER: &str = "MCP_CATALOG_HARVESTER";

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

impl ExitCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Usage => "usage",
            Self::Validation => "validation",
            Self::DependencyFailure => "dependency_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Error envelope printed by the CLI in `--json` mode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MachineError {}

#[cfg(test)]
mod tests {
    use super::{ExitCode, MachineError};

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(ExitCode::Success as u8, 0);
        assert_eq!(ExitCode::Usage as u8, 2);
        assert_eq!(ExitCode::Validation as u8, 3);
        assert_eq!(ExitCode::DependencyFailure as u8, 4);
        assert_eq!(ExitCode::Internal as u8, 10);
        assert_eq!(ExitCode::DependencyFailure.to_string(), "dependency_failure");
    }

    #[test]
    fn machine_error_serializes_details_sorted() {
        let err = MachineError::new("id_collision", "duplicate id")
            .with_detail("second", "b")
            .with_detail("first", "a");
        let text = serde_json::to_string(&err).expect("encode machine error");
        assert_eq!(
            text,
            r#"{"code":"id_collision","message":"duplicate id","details":{"first":"a","second":"b"}}"#
        );
    }
}
