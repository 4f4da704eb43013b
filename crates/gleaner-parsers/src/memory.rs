//! Memory parsing for cluster report output.

/// Memory format variants across report sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryFormat {
    /// Status report format: "4G", "1000M", "4096K" (no spaces)
    Status,
    /// Accounting format: "4Gn", "1000Mc" (with per-node/per-core suffix)
    Accounting,
}

/// Parse a memory string to megabytes.
///
/// Returns None for empty strings or placeholder values.
pub fn parse_memory_mb(s: &str, format: MemoryFormat) -> Option<u64> {
    if s.is_empty() || s == "-" {
        return None;
    }

    match format {
        MemoryFormat::Status => parse_status_memory(s),
        MemoryFormat::Accounting => {
            // Accounting memory can have an 'n' or 'c' suffix (per node/per core)
            let s = s.trim().trim_end_matches('n').trim_end_matches('c');
            parse_status_memory(s)
        }
    }
}

fn parse_status_memory(s: &str) -> Option<u64> {
    let s = s.trim();

    if let Some(stripped) = s.strip_suffix('G') {
        stripped.parse::<u64>().ok().map(|v| v * 1024)
    } else if let Some(stripped) = s.strip_suffix('M') {
        stripped.parse::<u64>().ok()
    } else if let Some(stripped) = s.strip_suffix('K') {
        stripped.parse::<u64>().ok().map(|v| v / 1024)
    } else {
        // Assume MB if no suffix
        s.parse::<u64>().ok()
    }
}
