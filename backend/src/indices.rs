use serde::Serialize;

use crate::error::SignalError;

/// A selectable index and the ticker it is fetched under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexInfo {
    pub name: &'static str,
    pub ticker: &'static str,
}

/// Indices offered to the user, in display order
pub const INDICES: [IndexInfo; 3] = [
    IndexInfo {
        name: "NIFTY 50",
        ticker: "^NSEI",
    },
    IndexInfo {
        name: "BANK NIFTY",
        ticker: "^NSEBANK",
    },
    IndexInfo {
        name: "FINNIFTY",
        ticker: "NSE:FINNIFTY",
    },
];

/// Case-insensitive lookup by display name
pub fn find_index(name: &str) -> Result<IndexInfo, SignalError> {
    let name = name.trim();
    INDICES
        .iter()
        .find(|index| index.name.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| SignalError::UnknownIndex(name.to_string()))
}
