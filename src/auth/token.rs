use base64ct::{Base64, Encoding};

pub const BASIC_SCHEME: &str = "Basic";

/// `Basic <base64(identifier:password)>`, the exact value of an HTTP Basic
/// `Authorization` header. Encoded, not encrypted.
pub fn basic_token(identifier: &str, password: &str) -> String {
    let raw = format!("{identifier}:{password}");
    format!("{BASIC_SCHEME} {}", Base64::encode_string(raw.as_bytes()))
}

/// Parses an `Authorization` header value into `(identifier, password)`.
///
/// The scheme is matched case-insensitively and the credentials are split at
/// the first `:`, so passwords may contain colons.
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
        return None;
    }
    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (identifier, password) = decoded.split_once(':')?;
    Some((identifier.to_owned(), password.to_owned()))
}
