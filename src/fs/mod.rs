//! Decoded share contents: nodes, attributes and folder trees.

pub mod attributes;
pub(crate) mod node;
pub mod tree;

pub use attributes::{decrypt_attributes, encrypt_attributes, FileAttributes, BAD_ATTRIBUTE_NAME};
pub use node::{Node, NodeKeyMaterial, NodeType};
pub use tree::{build_forest, decode_node, Decoded, DropReason, DroppedNode, Forest, TreeNode};
