//! Command and response shapes for the public sharing API.

use serde::{Deserialize, Serialize};

use crate::fs::node::NodeType;

/// `{"a":"g","g":1,...}`: fetch a file's size, attributes and direct URL.
///
/// Exactly one of `p` (public file handle) or `n` (node handle inside a
/// folder share) is set.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfoRequest {
    a: &'static str,
    g: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<String>,
}

impl FileInfoRequest {
    /// Request by public file handle.
    pub fn by_public_handle(handle: &str) -> Self {
        Self {
            a: "g",
            g: 1,
            p: Some(handle.to_string()),
            n: None,
        }
    }

    /// Request by node handle within a folder share.
    pub fn by_node_handle(handle: &str) -> Self {
        Self {
            a: "g",
            g: 1,
            p: None,
            n: Some(handle.to_string()),
        }
    }
}

/// Response to [`FileInfoRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfoResponse {
    /// Content size in bytes.
    #[serde(rename = "s")]
    pub size: u64,
    /// Encrypted attributes (base64url).
    #[serde(rename = "at")]
    pub attributes: String,
    #[serde(rename = "msd", default)]
    pub msd: i64,
    /// Direct content URL.
    #[serde(rename = "g")]
    pub url: String,
}

/// `{"a":"f","c":1,"ca":1,"r":1}`: recursive listing of a folder share.
#[derive(Debug, Clone, Serialize)]
pub struct FolderListRequest {
    a: &'static str,
    c: u8,
    ca: u8,
    r: u8,
}

impl FolderListRequest {
    pub fn recursive() -> Self {
        Self {
            a: "f",
            c: 1,
            ca: 1,
            r: 1,
        }
    }
}

impl Default for FolderListRequest {
    fn default() -> Self {
        Self::recursive()
    }
}

/// Response to [`FolderListRequest`].
#[derive(Debug, Clone, Deserialize)]
pub struct FolderListResponse {
    /// Flat node list, in no particular parent/child order.
    #[serde(rename = "f", default)]
    pub nodes: Vec<RawNode>,
    #[serde(rename = "noc", default)]
    pub noc: i64,
    #[serde(rename = "sn", default)]
    pub sn: String,
}

/// A node as it arrives from the listing, before any decryption.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    #[serde(rename = "h")]
    pub hash: String,
    #[serde(rename = "p", default)]
    pub parent: Option<String>,
    #[serde(rename = "u", default)]
    pub owner: Option<String>,
    #[serde(rename = "t")]
    pub node_type: NodeType,
    /// Encrypted attributes (base64url).
    #[serde(rename = "a", default)]
    pub attributes: String,
    /// Compound key `owner:encrypted-key[/owner:encrypted-key...]`.
    #[serde(rename = "k", default)]
    pub key: String,
    #[serde(rename = "ts", default)]
    pub timestamp: i64,
    #[serde(rename = "s", default)]
    pub size: u64,
    /// Thumbnail/preview references. Carried, never interpreted.
    #[serde(rename = "fa", default)]
    pub file_attr: Option<String>,
}

/// Query parameters that scope a command to a folder share.
pub fn folder_query(handle: &str) -> [(&'static str, &str); 4] {
    [("n", handle), ("ec", ""), ("v", "2"), ("domain", "meganz")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_info_request_shapes() {
        let by_public = serde_json::to_value(FileInfoRequest::by_public_handle("AbCd1234")).unwrap();
        assert_eq!(by_public, json!({"a": "g", "g": 1, "p": "AbCd1234"}));

        let by_node = serde_json::to_value(FileInfoRequest::by_node_handle("NoDe5678")).unwrap();
        assert_eq!(by_node, json!({"a": "g", "g": 1, "n": "NoDe5678"}));
    }

    #[test]
    fn test_folder_list_request_shape() {
        let value = serde_json::to_value(FolderListRequest::recursive()).unwrap();
        assert_eq!(value, json!({"a": "f", "c": 1, "ca": 1, "r": 1}));
    }

    #[test]
    fn test_file_info_response_parse() {
        let resp: FileInfoResponse = serde_json::from_value(json!({
            "s": 1024, "at": "abc", "msd": 0, "g": "https://example/content"
        }))
        .unwrap();
        assert_eq!(resp.size, 1024);
        assert_eq!(resp.attributes, "abc");
        assert_eq!(resp.url, "https://example/content");
    }

    #[test]
    fn test_raw_node_parse() {
        let node: RawNode = serde_json::from_value(json!({
            "h": "A", "p": "root", "u": "owner", "t": 1,
            "a": "attr", "k": "owner:key", "ts": 1700000000, "s": 0, "fa": ""
        }))
        .unwrap();
        assert_eq!(node.hash, "A");
        assert_eq!(node.parent.as_deref(), Some("root"));
        assert_eq!(node.node_type, NodeType::Folder);
        assert_eq!(node.timestamp, 1_700_000_000);

        let sparse: RawNode = serde_json::from_value(json!({"h": "B", "t": 7})).unwrap();
        assert!(sparse.parent.is_none());
        assert_eq!(sparse.node_type, NodeType::Unknown(7));
        assert!(sparse.key.is_empty());
    }

    #[test]
    fn test_folder_query() {
        let query = folder_query("AbCd1234");
        assert_eq!(query[0], ("n", "AbCd1234"));
        assert_eq!(query[1], ("ec", ""));
        assert_eq!(query[2], ("v", "2"));
        assert_eq!(query[3], ("domain", "meganz"));
    }
}
