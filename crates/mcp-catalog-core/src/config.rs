// SPDX-License-Identifier: Apache-2.0

pub const DEFAULT_HARVESTER_PROGRAM: &str = "mcp-ingest";

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Harvester executable: explicit flag, then `MCP_CATALOG_HARVESTER`, then `mcp-ingest`.
#[must_use]
pub fn resolve_harvester_program(explicit: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .or_else(|| env_non_empty(crate::ENV_HARVESTER))
        .unwrap_or_else(|| DEFAULT_HARVESTER_PROGRAM.to_string())
}

#[cfg(test)]
mod tests {
    use super::{env_bool, resolve_harvester_program};

    #[test]
    fn explicit_harvester_wins() {
        assert_eq!(
            resolve_harvester_program(Some(" /opt/bin/harvest ")),
            "/opt/bin/harvest"
        );
    }

    #[test]
    fn unset_flag_falls_back_to_default() {
        assert!(env_bool("MCP_CATALOG_TEST_FLAG_THAT_IS_NEVER_SET", true));
        assert!(!env_bool("MCP_CATALOG_TEST_FLAG_THAT_IS_NEVER_SET", false));
    }
}
