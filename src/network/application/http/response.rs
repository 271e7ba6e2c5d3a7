//! Status-line parsing.
//!
//! Only the first line of a response is ever looked at. The parse is bounded
//! by the bytes actually received: a prefix too short to hold a complete
//! `HTTP/x.y NNN` is treated as malformed, never padded with stale buffer
//! contents.

/// Bytes read from a connection to find the status line.
pub const STATUS_PREFIX_LEN: usize = 32;

/// Result code reported when no valid status was obtained.
pub const NO_STATUS: u16 = 0;

/// Parse the three-digit status code from the start of a response.
///
/// Accepts `HTTP/<digit>.<digit> <NNN>` where the code's first digit is
/// 1-9, followed by a space, a line break or the end of the data. Returns
/// `None` for anything else.
///
/// ```rust
/// use nbhttp::network::application::http::parse_status_line;
///
/// assert_eq!(parse_status_line(b"HTTP/1.1 404 Not Found\r\n"), Some(404));
/// assert_eq!(parse_status_line(b"HTTP/1.1 2"), None);
/// ```
pub fn parse_status_line(data: &[u8]) -> Option<u16> {
    let rest = data.strip_prefix(b"HTTP/")?;
    let (version, rest) = split_at_checked(rest, 4)?;
    if !(version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit() && version[3] == b' ') {
        return None;
    }

    let (code, rest) = split_at_checked(rest, 3)?;
    if !(b'1'..=b'9').contains(&code[0]) || !code[1].is_ascii_digit() || !code[2].is_ascii_digit() {
        return None;
    }
    match rest.first() {
        None | Some(b' ') | Some(b'\r') | Some(b'\n') => {}
        Some(_) => return None,
    }

    Some(code.iter().fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0')))
}

fn split_at_checked(data: &[u8], mid: usize) -> Option<(&[u8], &[u8])> {
    if data.len() < mid {
        return None;
    }
    Some(data.split_at(mid))
}

/// Human-readable class of a status code, for diagnostics.
pub fn status_class(code: u16) -> &'static str {
    match code {
        100..=199 => "informational",
        200..=299 => "success",
        300..=399 => "redirection",
        400..=499 => "client error",
        500..=599 => "server error",
        _ => "unknown",
    }
}
