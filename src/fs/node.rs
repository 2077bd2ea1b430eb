//! Filesystem node types.

use serde::{Deserialize, Serialize};

/// Node type matching MEGA's wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum NodeType {
    /// Regular file
    File,
    /// Folder/directory
    Folder,
    /// Root folder (Cloud Drive)
    Root,
    /// Inbox folder
    Inbox,
    /// Trash folder
    Trash,
    /// Any code this client does not know
    Unknown(i64),
}

impl From<i64> for NodeType {
    fn from(t: i64) -> Self {
        match t {
            0 => NodeType::File,
            1 => NodeType::Folder,
            2 => NodeType::Root,
            3 => NodeType::Inbox,
            4 => NodeType::Trash,
            other => NodeType::Unknown(other),
        }
    }
}

impl From<NodeType> for i64 {
    fn from(t: NodeType) -> Self {
        match t {
            NodeType::File => 0,
            NodeType::Folder => 1,
            NodeType::Root => 2,
            NodeType::Inbox => 3,
            NodeType::Trash => 4,
            NodeType::Unknown(code) => code,
        }
    }
}

impl NodeType {
    /// Fixed display name for node types that carry no encrypted attributes.
    pub fn fixed_name(&self) -> Option<String> {
        match self {
            NodeType::File | NodeType::Folder => None,
            NodeType::Root => Some("Cloud Drive".to_string()),
            NodeType::Inbox => Some("InBox".to_string()),
            NodeType::Trash => Some("Trash".to_string()),
            NodeType::Unknown(code) => Some(format!("Unknown node type {}", code)),
        }
    }

    /// Check if this node type can have children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Folder | NodeType::Root | NodeType::Inbox | NodeType::Trash
        )
    }
}

/// Per-node key material, derived once while decoding the listing.
#[derive(Clone, PartialEq, Eq)]
pub struct NodeKeyMaterial {
    /// AES-128 key for attributes (and content, for files).
    pub key: [u8; 16],
    /// CTR counter block (files only).
    pub iv: Option<[u8; 16]>,
    /// Condensed content MAC (files only).
    pub mac: Option<[u8; 8]>,
    /// Decrypted node key before folding.
    pub compkey: Vec<u8>,
}

impl std::fmt::Debug for NodeKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeKeyMaterial")
            .field("compkey_len", &self.compkey.len())
            .finish_non_exhaustive()
    }
}

/// A decoded node from a folder listing.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name (decrypted), or a fixed/sentinel name
    pub name: String,
    /// Node handle (unique identifier)
    pub hash: String,
    /// Parent node handle; may name a node that is not in the listing
    pub parent: Option<String>,
    /// Owner user handle
    pub owner: Option<String>,
    /// Node type
    pub node_type: NodeType,
    /// File size in bytes (0 for folders)
    pub size: u64,
    /// Creation timestamp (Unix epoch)
    pub timestamp: i64,
    /// Thumbnail/preview references (fa)
    pub file_attr: Option<String>,
    /// Handle of the folder share this node was listed from
    pub(crate) share_handle: String,
    pub(crate) keys: Option<NodeKeyMaterial>,
}

impl Node {
    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    /// Check if this node is a folder.
    pub fn is_folder(&self) -> bool {
        self.node_type == NodeType::Folder
    }

    /// Key material, if this node type carries any and it could be derived.
    pub fn keys(&self) -> Option<&NodeKeyMaterial> {
        self.keys.as_ref()
    }

    /// Handle of the share this node belongs to.
    pub fn share_handle(&self) -> &str {
        &self.share_handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_conversion() {
        assert_eq!(NodeType::from(0), NodeType::File);
        assert_eq!(NodeType::from(1), NodeType::Folder);
        assert_eq!(NodeType::from(2), NodeType::Root);
        assert_eq!(NodeType::from(3), NodeType::Inbox);
        assert_eq!(NodeType::from(4), NodeType::Trash);
        assert_eq!(NodeType::from(99), NodeType::Unknown(99));
        assert_eq!(i64::from(NodeType::Unknown(-1)), -1);
        assert_eq!(i64::from(NodeType::Trash), 4);
    }

    #[test]
    fn test_node_type_serde() {
        let t: NodeType = serde_json::from_str("1").unwrap();
        assert_eq!(t, NodeType::Folder);
        assert_eq!(serde_json::to_string(&NodeType::Unknown(9)).unwrap(), "9");
    }

    #[test]
    fn test_fixed_names() {
        assert_eq!(NodeType::File.fixed_name(), None);
        assert_eq!(NodeType::Folder.fixed_name(), None);
        assert_eq!(NodeType::Root.fixed_name().as_deref(), Some("Cloud Drive"));
        assert_eq!(NodeType::Inbox.fixed_name().as_deref(), Some("InBox"));
        assert_eq!(NodeType::Trash.fixed_name().as_deref(), Some("Trash"));
        assert_eq!(
            NodeType::Unknown(7).fixed_name().as_deref(),
            Some("Unknown node type 7")
        );
    }

    #[test]
    fn test_node_type_properties() {
        assert!(!NodeType::File.is_container());
        assert!(NodeType::Folder.is_container());
        assert!(NodeType::Root.is_container());
        assert!(!NodeType::Unknown(5).is_container());
    }
}
