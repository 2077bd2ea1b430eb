//! MEGA-specific key unpacking and folding.
//!
//! These are proprietary layouts used by MEGA, NOT industry-standard KDFs.
//! File keys travel as 32 bytes (eight big-endian 32-bit words, "a32"):
//! the content key XORed with the nonce and MAC, followed by the nonce and MAC.

use crate::error::{MegaError, Result};

/// Length of the packed key carried by file links and file nodes.
pub const PACKED_FILE_KEY_LEN: usize = 32;

/// Length of a plain AES-128 key (folder links, folder nodes).
pub const FOLDER_KEY_LEN: usize = 16;

/// Key, counter seed and MAC recovered from a packed file key.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey {
    /// AES-128 content key.
    pub key: [u8; 16],
    /// CTR counter block: 8-byte nonce followed by an 8-byte zero counter.
    pub iv: [u8; 16],
    /// Condensed content MAC. Carried along, only checked on request.
    pub mac: [u8; 8],
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey").finish_non_exhaustive()
    }
}

/// Convert bytes to big-endian 32-bit words. Trailing bytes that do not fill a
/// whole word are ignored.
pub fn bytes_to_a32(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .collect()
}

/// Convert big-endian 32-bit words back to bytes.
pub fn a32_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Fold eight key words into the content key, counter seed and MAC.
///
/// key = words[0..4] ^ words[4..8], iv = words[4], words[5], 0, 0,
/// mac = words[6], words[7].
pub fn fold_file_key(words: &[u32; 8]) -> DerivedKey {
    let key_words = [
        words[0] ^ words[4],
        words[1] ^ words[5],
        words[2] ^ words[6],
        words[3] ^ words[7],
    ];

    let mut key = [0u8; 16];
    key.copy_from_slice(&a32_to_bytes(&key_words));
    let mut iv = [0u8; 16];
    iv[..8].copy_from_slice(&a32_to_bytes(&words[4..6]));
    let mut mac = [0u8; 8];
    mac.copy_from_slice(&a32_to_bytes(&words[6..8]));

    DerivedKey { key, iv, mac }
}

/// Unpack the 32-byte key material from a file link.
///
/// Any other length is an [`MegaError::InvalidLink`]; the material is never
/// truncated or padded.
pub fn unpack_file_key(packed: &[u8]) -> Result<DerivedKey> {
    if packed.len() != PACKED_FILE_KEY_LEN {
        return Err(MegaError::InvalidLink(format!(
            "file key must be {} bytes, got {}",
            PACKED_FILE_KEY_LEN,
            packed.len()
        )));
    }
    let words: [u32; 8] = bytes_to_a32(packed)
        .try_into()
        .map_err(|_| MegaError::InvalidLink("file key is not eight words".to_string()))?;
    Ok(fold_file_key(&words))
}

/// Unpack the 16-byte master key from a folder link.
pub fn unpack_folder_key(packed: &[u8]) -> Result<[u8; 16]> {
    packed.try_into().map_err(|_| {
        MegaError::InvalidLink(format!(
            "folder key must be {} bytes, got {}",
            FOLDER_KEY_LEN,
            packed.len()
        ))
    })
}

/// Pack a content key, nonce and MAC into the 32-byte link form.
///
/// This is the inverse of [`unpack_file_key`].
pub fn pack_file_key(key: &[u8; 16], nonce: &[u8; 8], mac: &[u8; 8]) -> [u8; 32] {
    let mut packed = [0u8; 32];
    for i in 0..8 {
        packed[i] = key[i] ^ nonce[i];
        packed[8 + i] = key[8 + i] ^ mac[i];
        packed[16 + i] = nonce[i];
        packed[24 + i] = mac[i];
    }
    packed
}
