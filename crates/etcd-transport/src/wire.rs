//! etcd v2 JSON wire model
//!
//! Deserialization targets for the two body shapes the v2 keyspace API
//! produces: a success envelope wrapping a node tree, and an error
//! envelope with a numeric code.

use serde::Deserialize;

use crate::store::StoreEntry;

/// `errorCode` for a key that does not exist.
pub(crate) const CODE_KEY_NOT_FOUND: u64 = 100;

/// `errorCode` for an operation that expected a leaf but found a directory.
pub(crate) const CODE_NOT_A_FILE: u64 = 102;

/// Success envelope: `{"action": "...", "node": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct KeysResponse {
    #[allow(dead_code)]
    pub action: String,
    pub node: Node,
}

/// A node in the keyspace tree.
///
/// Directories carry `dir: true` and their immediate children in `nodes`;
/// leaves carry `value`. The index fields are ignored; reconciliation
/// works from the snapshot content alone.
#[derive(Debug, Deserialize)]
pub(crate) struct Node {
    pub key: Option<String>,
    #[serde(default)]
    pub dir: bool,
    pub value: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    /// Flatten into the transport's [`StoreEntry`] representation.
    ///
    /// `fallback_key` covers the store root, which the wire format leaves
    /// keyless.
    pub(crate) fn into_entry(self, fallback_key: &str) -> StoreEntry {
        let key = self.key.unwrap_or_else(|| fallback_key.to_string());
        let children = self
            .nodes
            .into_iter()
            .map(|child| child.into_entry(fallback_key))
            .collect();
        StoreEntry {
            key,
            is_dir: self.dir,
            value: self.value,
            children,
        }
    }
}

/// Error envelope: `{"errorCode": 100, "message": "...", "cause": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    pub error_code: u64,
    pub message: String,
    #[allow(dead_code)]
    pub cause: Option<String>,
}
