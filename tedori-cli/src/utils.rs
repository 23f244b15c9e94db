use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a yen amount.
#[derive(Debug, Error)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Normalizes amount input: trims whitespace, drops a leading yen sign or a
/// trailing 円, and removes commas (thousands separator).
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix('¥')
        .or_else(|| trimmed.strip_prefix('￥'))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('円').unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses a string into a yen amount.
///
/// Accepts `"5,000,000"`, `"¥5,000,000"` and `"5000000円"`.
/// Empty or whitespace-only input is an error: every form field is required.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid amount: {}", e);
        ParseAmountError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Number of terminal columns `s` occupies. East Asian wide characters
/// (kana, kanji, full-width forms) take two columns.
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

/// Pads `s` on the right with spaces to `width` display columns.
pub fn pad_to_width(
    s: &str,
    width: usize,
) -> String {
    let padding = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(padding))
}
