//! Share link parsing and key unpacking.
//!
//! Supported forms:
//! - `https://mega.nz/#!HANDLE!KEY` (file, legacy)
//! - `https://mega.nz/file/HANDLE#KEY` (file)
//! - `https://mega.nz/folder/HANDLE#KEY` (folder)
//!
//! Handles are 8 characters. File keys are 43 base64url characters (32 bytes
//! packed), folder keys are 22 characters (16 bytes). Anything else is an
//! [`MegaError::InvalidLink`].

use crate::base64::{base64url_decode, is_base64url_char};
use crate::crypto::keys::{unpack_file_key, unpack_folder_key, DerivedKey};
use crate::error::{MegaError, Result};

const LEGACY_FILE_PREFIX: &str = "https://mega.nz/#";
const FILE_PREFIX: &str = "https://mega.nz/file/";
const FOLDER_MARKER: &str = "https://mega.nz/folder/";

const HANDLE_LEN: usize = 8;
const FILE_KEY_TOKEN_LEN: usize = 43;
const FOLDER_KEY_TOKEN_LEN: usize = 22;

/// A parsed share link with its key material already unpacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    /// Link to a single file.
    File {
        /// Public file handle.
        handle: String,
        /// Content key, counter seed and MAC.
        key: DerivedKey,
    },
    /// Link to a shared folder.
    Folder {
        /// Public folder handle.
        handle: String,
        /// Folder master key used to decrypt every node key in the listing.
        key: [u8; 16],
    },
}

impl ShareLink {
    /// Parse either kind of share link.
    pub fn parse(url: &str) -> Result<Self> {
        if url.contains("/folder/") {
            let (handle, key) = parse_folder_link(url)?;
            return Ok(ShareLink::Folder { handle, key });
        }
        let (handle, key) = parse_file_link(url)?;
        Ok(ShareLink::File { handle, key })
    }

    /// The public handle of the linked resource.
    pub fn handle(&self) -> &str {
        match self {
            ShareLink::File { handle, .. } | ShareLink::Folder { handle, .. } => handle,
        }
    }

    /// Returns true if this is a folder link.
    pub fn is_folder(&self) -> bool {
        matches!(self, ShareLink::Folder { .. })
    }
}

/// Parse a file link into its handle and derived key.
pub fn parse_file_link(url: &str) -> Result<(String, DerivedKey)> {
    let (handle, token) = split_file_link(url)?;
    check_len("handle", handle, HANDLE_LEN)?;
    check_len("file key", token, FILE_KEY_TOKEN_LEN)?;

    let packed = decode_token(token)?;
    Ok((handle.to_string(), unpack_file_key(&packed)?))
}

/// Parse a folder link into its handle and master key.
pub fn parse_folder_link(url: &str) -> Result<(String, [u8; 16])> {
    let invalid = || MegaError::InvalidLink(format!("not a folder link: {}", url));

    let start = url.find(FOLDER_MARKER).ok_or_else(invalid)? + FOLDER_MARKER.len();
    let rest = &url[start..];
    let handle = take_token(rest);
    let rest = rest[handle.len()..].strip_prefix('#').ok_or_else(invalid)?;
    // Trailing text after the key token (sub-paths, query strings) is ignored.
    let token = take_token(rest);

    check_len("handle", handle, HANDLE_LEN)?;
    check_len("folder key", token, FOLDER_KEY_TOKEN_LEN)?;

    let packed = decode_token(token)?;
    Ok((handle.to_string(), unpack_folder_key(&packed)?))
}

/// Checks if a URL is a well-formed file link.
pub fn is_file_link(url: &str) -> bool {
    parse_file_link(url).is_ok()
}

/// Checks if a URL is a well-formed folder link.
pub fn is_folder_link(url: &str) -> bool {
    parse_folder_link(url).is_ok()
}

fn split_file_link(url: &str) -> Result<(&str, &str)> {
    if let Some(rest) = url.strip_prefix(FILE_PREFIX) {
        return rest
            .split_once('#')
            .ok_or_else(|| MegaError::InvalidLink(format!("missing key: {}", url)));
    }

    let parts: Vec<&str> = url.splitn(3, '!').collect();
    if parts.len() != 3 || parts[0] != LEGACY_FILE_PREFIX {
        return Err(MegaError::InvalidLink(format!("not a file link: {}", url)));
    }
    Ok((parts[1], parts[2]))
}

fn take_token(s: &str) -> &str {
    let end = s.find(|c: char| !is_base64url_char(c)).unwrap_or(s.len());
    &s[..end]
}

fn check_len(what: &str, value: &str, expected: usize) -> Result<()> {
    if value.len() != expected {
        return Err(MegaError::InvalidLink(format!(
            "{} must be {} characters, got {}",
            what,
            expected,
            value.len()
        )));
    }
    Ok(())
}

fn decode_token(token: &str) -> Result<Vec<u8>> {
    base64url_decode(token)
        .map_err(|e| MegaError::InvalidLink(format!("key is not base64url: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64::base64url_encode;
    use crate::crypto::keys::pack_file_key;

    const HANDLE: &str = "AbCd1234";

    fn file_token() -> String {
        let token = base64url_encode(&pack_file_key(&[7u8; 16], &[1u8; 8], &[2u8; 8]));
        assert_eq!(token.len(), FILE_KEY_TOKEN_LEN);
        token
    }

    fn folder_token() -> String {
        let token = base64url_encode(&[9u8; 16]);
        assert_eq!(token.len(), FOLDER_KEY_TOKEN_LEN);
        token
    }

    #[test]
    fn test_parse_legacy_file_link() {
        let url = format!("https://mega.nz/#!{}!{}", HANDLE, file_token());
        let (handle, key) = parse_file_link(&url).unwrap();
        assert_eq!(handle, HANDLE);
        assert_eq!(key.key, [7u8; 16]);
        assert_eq!(key.iv, [1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(key.mac, [2u8; 8]);
    }

    #[test]
    fn test_parse_new_file_link() {
        let url = format!("https://mega.nz/file/{}#{}", HANDLE, file_token());
        let link = ShareLink::parse(&url).unwrap();
        assert_eq!(link.handle(), HANDLE);
        assert!(!link.is_folder());
    }

    #[test]
    fn test_file_link_is_deterministic() {
        let url = format!("https://mega.nz/#!{}!{}", HANDLE, file_token());
        assert_eq!(ShareLink::parse(&url).unwrap(), ShareLink::parse(&url).unwrap());
    }

    #[test]
    fn test_file_link_wrong_prefix() {
        let url = format!("https://example.com/#!{}!{}", HANDLE, file_token());
        assert!(matches!(parse_file_link(&url), Err(MegaError::InvalidLink(_))));
    }

    #[test]
    fn test_file_link_wrong_lengths() {
        let token = file_token();
        let short_handle = format!("https://mega.nz/#!{}!{}", "abc", token);
        let long_key = format!("https://mega.nz/#!{}!{}A", HANDLE, token);
        let short_key = format!("https://mega.nz/#!{}!{}", HANDLE, &token[..42]);
        for url in [short_handle, long_key, short_key] {
            assert!(matches!(parse_file_link(&url), Err(MegaError::InvalidLink(_))), "{url}");
        }
    }

    #[test]
    fn test_file_link_missing_parts() {
        assert!(parse_file_link("https://mega.nz/#!AbCd1234").is_err());
        assert!(parse_file_link("https://mega.nz/file/AbCd1234").is_err());
        assert!(parse_file_link("").is_err());
    }

    #[test]
    fn test_file_link_bad_base64() {
        let url = format!("https://mega.nz/#!{}!{}", HANDLE, "*".repeat(43));
        assert!(matches!(parse_file_link(&url), Err(MegaError::InvalidLink(_))));
    }

    #[test]
    fn test_parse_folder_link() {
        let url = format!("https://mega.nz/folder/{}#{}", HANDLE, folder_token());
        let link = ShareLink::parse(&url).unwrap();
        assert_eq!(
            link,
            ShareLink::Folder {
                handle: HANDLE.to_string(),
                key: [9u8; 16],
            }
        );
        assert!(link.is_folder());
    }

    #[test]
    fn test_folder_link_ignores_trailing_path() {
        let url = format!(
            "https://mega.nz/folder/{}#{}/folder/XyZ98765",
            HANDLE,
            folder_token()
        );
        let (handle, key) = parse_folder_link(&url).unwrap();
        assert_eq!(handle, HANDLE);
        assert_eq!(key, [9u8; 16]);
    }

    #[test]
    fn test_folder_link_wrong_lengths() {
        let token = folder_token();
        let bad = [
            format!("https://mega.nz/folder/{}#{}", "abc", token),
            format!("https://mega.nz/folder/{}#{}AA", HANDLE, token),
            format!("https://mega.nz/folder/{}", HANDLE),
        ];
        for url in bad {
            assert!(matches!(parse_folder_link(&url), Err(MegaError::InvalidLink(_))), "{url}");
        }
    }

    #[test]
    fn test_link_classification() {
        let file = format!("https://mega.nz/#!{}!{}", HANDLE, file_token());
        let folder = format!("https://mega.nz/folder/{}#{}", HANDLE, folder_token());
        assert!(is_file_link(&file));
        assert!(!is_folder_link(&file));
        assert!(is_folder_link(&folder));
        assert!(!is_file_link(&folder));
        assert!(!is_file_link("https://example.com"));
    }
}
