//! Folder listing decoding and forest reconstruction.
//!
//! The listing is a flat node array in arbitrary order. Each node's key is
//! decrypted with the folder master key, folded into its content key, and
//! used to decrypt its name. The nodes are then linked into trees in a single
//! pass: every handle, whether seen as a node or only as a parent reference,
//! gets one arena slot. Slots that never receive a node are the implicit
//! parents; their children are the roots of the forest.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::api::commands::RawNode;
use crate::base64::base64url_decode;
use crate::crypto::aes::aes128_ecb_decrypt;
use crate::crypto::keys::{a32_to_bytes, bytes_to_a32, fold_file_key};
use crate::error::{MegaError, Result};
use crate::fs::attributes::{decrypt_attributes, BAD_ATTRIBUTE_NAME};
use crate::fs::node::{Node, NodeKeyMaterial, NodeType};

/// Why a listed node is absent from the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// A file whose decrypted key has fewer than eight words.
    InsufficientKeyMaterial { words: usize },
    /// Another node with the same handle was already placed.
    DuplicateHash,
    /// The node's ancestry loops back on itself and never reaches a root.
    Unreachable,
}

/// A listed node that was left out of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedNode {
    pub hash: String,
    pub reason: DropReason,
}

/// A node together with its children.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub node: Node,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Returns true if no listed node names this one as its parent.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

/// The trees produced by one folder listing.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    /// Top-level nodes: parentless nodes first, then children of unlisted
    /// parents in order of first reference.
    pub roots: Vec<TreeNode>,
    /// Listed nodes that could not be placed.
    pub dropped: Vec<DroppedNode>,
}

impl Forest {
    /// Total number of nodes in all trees.
    pub fn len(&self) -> usize {
        self.roots.iter().map(TreeNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first walk yielding each node with its `/`-joined path.
    ///
    /// Root paths are `/<name>`; children extend their parent's path.
    pub fn walk(&self) -> Vec<(String, &Node)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<(String, &TreeNode)> = self
            .roots
            .iter()
            .rev()
            .map(|t| (format!("/{}", t.node.name), t))
            .collect();

        while let Some((path, tree)) = stack.pop() {
            for child in tree.children.iter().rev() {
                stack.push((format!("{}/{}", path, child.node.name), child));
            }
            out.push((path, &tree.node));
        }
        out
    }

    /// Find a node by path as produced by [`Forest::walk`].
    pub fn stat(&self, path: &str) -> Option<&Node> {
        let wanted = normalize_path(path);
        self.walk()
            .into_iter()
            .find(|(p, _)| *p == wanted)
            .map(|(_, node)| node)
    }
}

/// Outcome of decoding one listed node.
#[derive(Debug)]
pub enum Decoded {
    Node(Node),
    Dropped(DroppedNode),
}

/// Decode a node's key material and name.
///
/// Per-node attribute failures are logged and replaced with
/// [`BAD_ATTRIBUTE_NAME`]. Structural key failures (compound key without a
/// `:`, key not base64url, key not a whole number of blocks) abort with
/// [`MegaError::Decode`].
pub fn decode_node(master_key: &[u8; 16], raw: RawNode, share_handle: &str) -> Result<Decoded> {
    let (name, keys) = match raw.node_type.fixed_name() {
        Some(name) => (name, None),
        None => {
            let compkey = decrypt_node_key(master_key, &raw)?;
            let keys = match derive_key_material(raw.node_type, compkey) {
                Ok(keys) => keys,
                Err(words) => {
                    return Ok(Decoded::Dropped(DroppedNode {
                        hash: raw.hash,
                        reason: DropReason::InsufficientKeyMaterial { words },
                    }));
                }
            };
            let name = match keys
                .as_ref()
                .ok_or_else(|| MegaError::BadAttribute("folder key shorter than 16 bytes".into()))
                .and_then(|k| decrypt_attributes(&k.key, &raw.attributes))
            {
                Ok(attrs) => attrs.name,
                Err(err) => {
                    warn!(hash = %raw.hash, error = %err, "undecodable node attributes");
                    BAD_ATTRIBUTE_NAME.to_string()
                }
            };
            (name, keys)
        }
    };

    Ok(Decoded::Node(Node {
        name,
        hash: raw.hash,
        parent: raw.parent,
        owner: raw.owner,
        node_type: raw.node_type,
        size: raw.size,
        timestamp: raw.timestamp,
        file_attr: raw.file_attr,
        share_handle: share_handle.to_string(),
        keys,
    }))
}

/// Decrypt the first `owner:key` pair of the compound key into a32 words.
fn decrypt_node_key(master_key: &[u8; 16], raw: &RawNode) -> Result<Vec<u32>> {
    // Only the first owner:key pair is decoded.
    let first = raw.key.split('/').next().unwrap_or_default();
    let encrypted = first.split(':').nth(1).ok_or_else(|| {
        MegaError::Decode(format!("node {}: compound key has no ':' separator", raw.hash))
    })?;

    let encrypted = base64url_decode(encrypted)
        .map_err(|e| MegaError::Decode(format!("node {}: key is not base64url: {}", raw.hash, e)))?;
    let plain = aes128_ecb_decrypt(&encrypted, master_key)
        .map_err(|e| MegaError::Decode(format!("node {}: {}", raw.hash, e)))?;

    Ok(bytes_to_a32(&plain))
}

/// Fold compkey words into key material.
///
/// Files need eight words; fewer is reported as `Err(word_count)`. Folders use
/// the first 16 bytes of the compkey and get no key material when it is
/// shorter than that.
fn derive_key_material(
    node_type: NodeType,
    compkey: Vec<u32>,
) -> std::result::Result<Option<NodeKeyMaterial>, usize> {
    let compkey_bytes = a32_to_bytes(&compkey);

    if node_type == NodeType::File {
        let words: [u32; 8] = compkey
            .get(..8)
            .and_then(|w| w.try_into().ok())
            .ok_or(compkey.len())?;
        let derived = fold_file_key(&words);
        return Ok(Some(NodeKeyMaterial {
            key: derived.key,
            iv: Some(derived.iv),
            mac: Some(derived.mac),
            compkey: compkey_bytes,
        }));
    }

    if compkey_bytes.len() > 16 {
        debug!(len = compkey_bytes.len(), "folder key longer than 16 bytes, using the first 16");
    }
    let key: Option<[u8; 16]> = compkey_bytes.get(..16).and_then(|k| k.try_into().ok());
    Ok(key.map(|key| NodeKeyMaterial {
        key,
        iv: None,
        mac: None,
        compkey: compkey_bytes,
    }))
}

/// One arena entry: a handle that was listed, referenced as a parent, or both.
#[derive(Default)]
struct Slot {
    node: Option<Node>,
    children: Vec<usize>,
}

/// Arena of slots indexed by handle. Slot 0 collects nodes without a parent.
struct Arena {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

const TOP: usize = 0;

impl Arena {
    fn new() -> Self {
        Self {
            slots: vec![Slot::default()],
            index: HashMap::new(),
        }
    }

    fn slot_for(&mut self, hash: &str) -> usize {
        if let Some(&idx) = self.index.get(hash) {
            return idx;
        }
        let idx = self.slots.len();
        self.slots.push(Slot::default());
        self.index.insert(hash.to_string(), idx);
        idx
    }

    fn take_tree(&mut self, idx: usize) -> Option<TreeNode> {
        let node = self.slots[idx].node.take()?;
        let child_slots = std::mem::take(&mut self.slots[idx].children);
        let children = child_slots
            .into_iter()
            .filter_map(|child| self.take_tree(child))
            .collect();
        Some(TreeNode { node, children })
    }
}

/// Decode every listed node and link them into a forest.
///
/// Input order does not matter: children may arrive before their parents.
/// Any structural key failure aborts the whole listing.
pub fn build_forest(master_key: &[u8; 16], nodes: Vec<RawNode>, share_handle: &str) -> Result<Forest> {
    let mut arena = Arena::new();
    let mut dropped = Vec::new();

    for raw in nodes {
        let node = match decode_node(master_key, raw, share_handle)? {
            Decoded::Node(node) => node,
            Decoded::Dropped(d) => {
                dropped.push(d);
                continue;
            }
        };

        let idx = arena.slot_for(&node.hash);
        if arena.slots[idx].node.is_some() {
            dropped.push(DroppedNode {
                hash: node.hash,
                reason: DropReason::DuplicateHash,
            });
            continue;
        }

        let parent = match node.parent.as_deref() {
            Some(p) if !p.is_empty() && p != node.hash => arena.slot_for(p),
            _ => TOP,
        };
        arena.slots[idx].node = Some(node);
        arena.slots[parent].children.push(idx);
    }

    let mut roots = Vec::new();
    for idx in 0..arena.slots.len() {
        if arena.slots[idx].node.is_some() {
            continue;
        }
        let child_slots = std::mem::take(&mut arena.slots[idx].children);
        roots.extend(child_slots.into_iter().filter_map(|c| arena.take_tree(c)));
    }

    // Whatever is still in the arena hangs off a parent cycle.
    for slot in &mut arena.slots {
        if let Some(node) = slot.node.take() {
            dropped.push(DroppedNode {
                hash: node.hash,
                reason: DropReason::Unreachable,
            });
        }
    }

    for d in &dropped {
        warn!(hash = %d.hash, reason = ?d.reason, "node dropped from listing");
    }

    let forest = Forest { roots, dropped };
    info!(
        nodes = forest.len(),
        roots = forest.roots.len(),
        dropped = forest.dropped.len(),
        "folder listing decoded"
    );
    Ok(forest)
}

fn normalize_path(path: &str) -> String {
    let mut result = path.replace("//", "/");
    while result.ends_with('/') && result.len() > 1 {
        result.pop();
    }
    if !result.starts_with('/') {
        result = format!("/{}", result);
    }
    result
}
