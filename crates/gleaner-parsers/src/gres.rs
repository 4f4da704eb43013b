//! GRES descriptor parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parsed generic-resource descriptor for an attached accelerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GresDescriptor {
    pub name: String,
    pub count: u32,
    /// Socket range the devices are attached to, e.g. "0-1".
    pub associated_sockets: Option<String>,
}

static GRES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^gpu:([A-Za-z0-9_.\-]+):(\d+)(?:\(S:([0-9,\-]+)\))?$").expect("valid gres regex")
});

static FEATURE_MEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)gb").expect("valid feature regex"));

/// Parse a scheduler GRES string of the shape `gpu:<name>:<count>` or
/// `gpu:<name>:<count>(S:<socket-range>)`.
///
/// GRES absence is a valid node state, so anything that does not match
/// degrades to None rather than raising.
pub fn parse_gres(s: &str) -> Option<GresDescriptor> {
    let captures = GRES_RE.captures(s.trim())?;
    let count = captures[2].parse().ok()?;
    Some(GresDescriptor {
        name: captures[1].to_string(),
        count,
        associated_sockets: captures.get(3).map(|m| m.as_str().to_string()),
    })
}

/// Extract a memory capacity in GB from a node feature string
/// (e.g. "skylake,32gb,nvlink" -> 32).
pub fn feature_memory_gb(features: &str) -> Option<u32> {
    FEATURE_MEM_RE
        .captures(features)
        .and_then(|captures| captures[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gres_with_sockets() {
        let gres = parse_gres("gpu:v100:4(S:0-1)").unwrap();
        assert_eq!(gres.name, "v100");
        assert_eq!(gres.count, 4);
        assert_eq!(gres.associated_sockets.as_deref(), Some("0-1"));
    }

    #[test]
    fn test_parse_gres_without_sockets() {
        let gres = parse_gres("gpu:t4:8").unwrap();
        assert_eq!(gres.name, "t4");
        assert_eq!(gres.count, 8);
        assert!(gres.associated_sockets.is_none());
    }

    #[test]
    fn test_unmatched_gres_degrades_to_none() {
        assert!(parse_gres("").is_none());
        assert!(parse_gres("(null)").is_none());
        assert!(parse_gres("fpga:stratix:2").is_none());
        assert!(parse_gres("gpu:v100").is_none());
    }

    #[test]
    fn test_feature_memory_gb() {
        assert_eq!(feature_memory_gb("skylake,32gb,nvlink"), Some(32));
        assert_eq!(feature_memory_gb("cascade,16GB"), Some(16));
        assert_eq!(feature_memory_gb("skylake,avx512"), None);
        assert_eq!(feature_memory_gb(""), None);
    }
}
