//! MEGA-style URL-safe base64 encoding/decoding.
//!
//! MEGA uses the URL-safe alphabet (`-` and `_`) without `=` padding. Link
//! keys are decoded leniently: padding is optional and unused trailing bits
//! in the final symbol are ignored.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const MEGA_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes to MEGA's URL-safe base64 (no padding).
///
/// # Example
/// ```
/// use megalink::base64::base64url_encode;
/// let encoded = base64url_encode(b"hello");
/// assert!(!encoded.contains('='));
/// assert!(!encoded.contains('+'));
/// assert!(!encoded.contains('/'));
/// ```
pub fn base64url_encode(data: &[u8]) -> String {
    MEGA_BASE64.encode(data)
}

/// Decode MEGA's URL-safe base64 to bytes.
///
/// # Example
/// ```
/// use megalink::base64::{base64url_encode, base64url_decode};
/// let original = b"hello world";
/// let encoded = base64url_encode(original);
/// let decoded = base64url_decode(&encoded).unwrap();
/// assert_eq!(decoded, original);
/// ```
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    MEGA_BASE64.decode(s)
}

/// Returns true if `c` belongs to the URL-safe base64 alphabet.
pub(crate) fn is_base64url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
