use crate::types::Classification;

/// Decide success from the first chunk of a response.
///
/// Only the first line is looked at. It is split on single spaces: token 0 is the
/// HTTP version, token 1 the status code. Only a code of exactly 200 counts as
/// success. A missing or non-numeric code, including a truncated first line or one
/// that does not fit a `u32`, yields an unknown code.
pub fn classify(first_chunk: &[u8]) -> Classification {
    let line_end = first_chunk
        .iter()
        .position(|b| *b == b'\r' || *b == b'\n')
        .unwrap_or(first_chunk.len());
    let code = first_chunk[..line_end]
        .split(|b| *b == b' ')
        .nth(1)
        .and_then(|tok| std::str::from_utf8(tok).ok())
        .and_then(|tok| tok.parse::<u32>().ok());

    match code {
        Some(200) => Classification { success: true, code },
        Some(_) => Classification { success: false, code },
        None => Classification::UNKNOWN,
    }
}

/// The code as printed in brief mode; `?` when unknown.
pub fn code_label(code: Option<u32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "?".to_string())
}
