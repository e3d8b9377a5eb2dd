//! Response parsing for queries
//!
//! A query answer is `<prefix><payload>` with nothing marking the end. The
//! payload may carry trailing CR/LF or NUL padding depending on firmware.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected response starting with {expected:?}, got {received:?}")]
    PrefixMismatch { expected: String, received: String },
    #[error("response is not valid text")]
    InvalidText,
    #[error("payload {0:?} is not a number")]
    NotNumeric(String),
}

/// Strip `prefix` from the front of `raw` and return the trimmed payload.
///
/// The prefix compares ignoring ASCII case; some firmware answers `OK+Get:`.
pub fn parse_response<'a>(raw: &'a [u8], prefix: &str) -> Result<&'a str, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidText)?;
    let text = text.trim_end_matches(|c: char| c == '\0' || c.is_ascii_whitespace());

    let matches = text
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if !matches {
        return Err(ParseError::PrefixMismatch {
            expected: prefix.to_string(),
            received: text.to_string(),
        });
    }

    Ok(&text[prefix.len()..])
}

/// Copy a string payload, keeping at most `max_len` characters
pub fn payload_string(payload: &str, max_len: usize) -> String {
    payload.chars().take(max_len).collect()
}

/// Parse an integer payload in the given radix.
///
/// The whole payload must be digits; partial numbers are rejected instead of
/// read as zero.
pub fn parse_int(payload: &str, radix: u32) -> Result<u32, ParseError> {
    let digits = payload.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseError::NotNumeric(payload.to_string()));
    }
    u32::from_str_radix(digits, radix).map_err(|_| ParseError::NotNumeric(payload.to_string()))
}
