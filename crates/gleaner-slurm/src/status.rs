//! Flat node status report parsing.
//!
//! The status command emits a header line naming fields, then one
//! line per node, separated by a multi-character delimiter. This
//! module fixes the field list and delimiter (the command contract)
//! and delegates the mechanics to the generic flat parser.

use gleaner_parsers::{parse_flat_report, ReportError, DEFAULT_DELIMITER};
use std::collections::BTreeMap;

/// Fields requested from the node status command, in order.
///
/// The names are the upstream tool's own; the translator owns their
/// canonical meanings.
pub const NODE_FIELDS: &[&str] = &[
    "NodeName",
    "StateLong",
    "Partitions",
    "CPUTot",
    "CPUAlloc",
    "Memory",
    "AllocMem",
    "Sockets",
    "CoresPerSocket",
    "Gres",
    "GresUsed",
    "AvailableFeatures",
    "Reason",
    "ReservationName",
];

/// Delimiter the status command is invoked with.
pub const STATUS_DELIMITER: &str = DEFAULT_DELIMITER;

/// Parse one flat node status report into per-node field maps, in
/// encounter order.
pub fn parse_status_report(text: &str) -> Result<Vec<BTreeMap<String, String>>, ReportError> {
    parse_flat_report(text, STATUS_DELIMITER)
}
