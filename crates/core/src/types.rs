use serde::{Deserialize, Serialize};

/// Integer identity of a relay node within the overlay.
pub type NodeId = u32;

/// Integer identity of a user endpoint.
pub type UserId = u32;

/// Directory entry for one relay: its identity and its exported public key.
///
/// Immutable once registered for the lifetime of the directory process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub node_id: NodeId,
    pub pub_key: String,
}

impl NodeInfo {
    pub fn new(node_id: NodeId, pub_key: impl Into<String>) -> Self {
        Self {
            node_id,
            pub_key: pub_key.into(),
        }
    }
}
