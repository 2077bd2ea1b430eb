//! Encrypted node attribute codec.
//!
//! Attributes are `MEGA` followed by a JSON object, zero-padded to the block
//! size, AES-128-CBC encrypted with a zero IV and base64url encoded. Only the
//! name (`n`) is read.

use serde::{Deserialize, Serialize};

use crate::base64::{base64url_decode, base64url_encode};
use crate::crypto::aes::{aes128_cbc_decrypt, aes128_cbc_encrypt};
use crate::error::{MegaError, Result};

const MARKER: &[u8] = b"MEGA";

/// Name assigned to nodes whose attributes cannot be decoded.
pub const BAD_ATTRIBUTE_NAME: &str = "BAD ATTRIBUTE";

/// Decrypted attribute payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttributes {
    #[serde(rename = "n", default)]
    pub name: String,
}

/// Decrypt an attribute blob and return its name.
///
/// If the plaintext is not valid JSON as a whole, the first `{"` ... `"}`
/// span inside it is tried instead, which tolerates garbage after the object.
pub fn decrypt_attributes(key: &[u8; 16], data: &str) -> Result<FileAttributes> {
    let encrypted = base64url_decode(data)
        .map_err(|e| MegaError::BadAttribute(format!("not base64url: {}", e)))?;
    let decrypted = aes128_cbc_decrypt(&encrypted, key)
        .map_err(|e| MegaError::BadAttribute(e.to_string()))?;

    let body = decrypted
        .strip_prefix(MARKER)
        .ok_or_else(|| MegaError::BadAttribute("missing MEGA marker".to_string()))?;

    let text = String::from_utf8_lossy(body);
    let text = text.trim_end_matches('\0');

    if let Ok(attrs) = serde_json::from_str(text) {
        return Ok(attrs);
    }

    embedded_object(text)
        .and_then(|candidate| serde_json::from_str(candidate).ok())
        .ok_or_else(|| MegaError::BadAttribute("attributes are not a JSON object".to_string()))
}

/// Encrypt attributes into the form [`decrypt_attributes`] reads.
pub fn encrypt_attributes(key: &[u8; 16], attrs: &FileAttributes) -> Result<String> {
    let mut plain = MARKER.to_vec();
    plain.extend_from_slice(serde_json::to_string(attrs)?.as_bytes());
    let padded_len = plain.len().div_ceil(16) * 16;
    plain.resize(padded_len, 0);

    Ok(base64url_encode(&aes128_cbc_encrypt(&plain, key)?))
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find("{\"")?;
    let end = text[start..].rfind("\"}")? + start + 2;
    Some(&text[start..end])
}
