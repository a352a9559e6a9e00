//! Display helpers shared by the screens.

use hc_api_types::Timestamp;

/// How many leading and trailing characters of an address stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSplit {
    pub head: usize,
    pub tail: usize,
}

/// Transaction screen: `0x123456...abcdef`.
pub const TRANSACTION_SPLIT: AddressSplit = AddressSplit { head: 8, tail: 6 };

/// Consent cards show a longer prefix and suffix.
pub const CONSENT_SPLIT: AddressSplit = AddressSplit { head: 10, tail: 8 };

pub fn format_address(address: &str, split: AddressSplit) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(split.head).collect();
    let tail: String = chars[chars.len().saturating_sub(split.tail)..].iter().collect();
    format!("{head}...{tail}")
}

/// `M/D/YYYY`, in UTC. Unparseable input is echoed back unchanged.
pub fn format_date(timestamp: Option<&Timestamp>) -> String {
    let Some(timestamp) = timestamp else {
        return String::new();
    };
    match timestamp.to_datetime() {
        Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
        None => timestamp.to_string(),
    }
}

/// Date followed by `h:MM:SS AM|PM`.
pub fn format_date_time(timestamp: Option<&Timestamp>) -> String {
    let Some(timestamp) = timestamp else {
        return String::new();
    };
    match timestamp.to_datetime() {
        Some(dt) => dt.format("%-m/%-d/%Y %-I:%M:%S %p").to_string(),
        None => timestamp.to_string(),
    }
}

/// Lowercased, whitespace-free token for status/type CSS classes.
pub fn css_token(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
