use std::sync::Arc;

use tokio::sync::RwLock;

use peelnet_core::NodeInfo;

/// Insertion-ordered collection of registered nodes.
///
/// Shared by handle: clones refer to the same underlying table, so the
/// state is injected into the router rather than living in a global.
#[derive(Clone, Default)]
pub struct NodeTable {
    nodes: Arc<RwLock<Vec<NodeInfo>>>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless its id is already present. Re-registration is
    /// an idempotent no-op (first write wins); returns whether the node
    /// was inserted.
    pub async fn register(&self, node: NodeInfo) -> bool {
        let mut nodes = self.nodes.write().await;
        if nodes.iter().any(|n| n.node_id == node.node_id) {
            return false;
        }
        nodes.push(node);
        true
    }

    /// Full snapshot in insertion order.
    pub async fn snapshot(&self) -> Vec<NodeInfo> {
        self.nodes.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }
}
