use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use peelnet_core::{MessageBody, NetworkConfig, NodeId, UserId};
use peelnet_crypto::{build_packet, public_key_from_b64, EncryptError, Hop};
use peelnet_directory::{DirectoryClient, DirectoryError};

use crate::circuit::select_circuit;

// Matches the relay-side bound: a stalled chain fails instead of hanging.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum EndpointError {
    #[error("insufficient nodes: need 3, got {available}")]
    InsufficientNodes { available: usize },

    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    #[error("node {node_id} has an unusable public key")]
    InvalidNodeKey { node_id: NodeId },

    #[error("layer encryption failed: {0}")]
    Encrypt(#[from] EncryptError),

    #[error("forward to entry node port {port} failed: {reason}")]
    Forward { port: u32, reason: String },

    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Introspection slots for one user endpoint.
#[derive(Debug, Clone, Default)]
pub struct LastObserved {
    pub sent: Option<String>,
    pub received: Option<String>,
    pub circuit: Vec<NodeId>,
}

/// State of one user endpoint process.
pub struct UserNode {
    user_id: UserId,
    cfg: NetworkConfig,
    directory: DirectoryClient,
    http: reqwest::Client,
    last: Mutex<LastObserved>,
}

impl UserNode {
    pub fn new(user_id: UserId, cfg: NetworkConfig) -> Result<Self, EndpointError> {
        let http = reqwest::Client::builder()
            .timeout(FORWARD_TIMEOUT)
            .build()?;
        Ok(Self {
            user_id,
            cfg,
            directory: DirectoryClient::new(&cfg)?,
            http,
            last: Mutex::new(LastObserved::default()),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn port(&self) -> u32 {
        self.cfg.user_port(self.user_id)
    }

    pub async fn last(&self) -> LastObserved {
        self.last.lock().await.clone()
    }

    /// Build a fresh three-hop circuit, layer-encrypt `message`, and hand
    /// the packet to the entry relay. Returns once the packet has
    /// traversed the whole chain (each relay awaits its downstream hop).
    pub async fn send_message(
        &self,
        message: &str,
        destination_user_id: UserId,
    ) -> Result<(), EndpointError> {
        self.last.lock().await.sent = Some(message.to_string());

        let nodes = self.directory.fetch_registry().await?;
        let circuit = select_circuit(&nodes)?;
        let circuit_ids: Vec<NodeId> = circuit.iter().map(|n| n.node_id).collect();
        self.last.lock().await.circuit = circuit_ids.clone();

        let mut hops: Vec<Hop> = Vec::with_capacity(circuit.len());
        for node in &circuit {
            let pubkey = public_key_from_b64(&node.pub_key)
                .map_err(|_| EndpointError::InvalidNodeKey { node_id: node.node_id })?;
            hops.push((self.cfg.relay_port(node.node_id), pubkey));
        }

        let exit_port = self.cfg.user_port(destination_user_id);
        let packet = build_packet(&hops, exit_port, message)?;

        tracing::debug!(
            user_id = self.user_id,
            destination_user_id,
            circuit = ?circuit_ids,
            "sending layered packet to entry node"
        );
        self.forward(hops[0].0, &packet).await
    }

    /// Store a delivered plaintext verbatim. No decryption happens here;
    /// every layer was peeled by the circuit before delivery.
    pub async fn receive(&self, message: &str) {
        self.last.lock().await.received = Some(message.to_string());
    }

    async fn forward(&self, port: u32, packet: &str) -> Result<(), EndpointError> {
        let url = format!("http://127.0.0.1:{port}/message");
        let resp = self
            .http
            .post(&url)
            .json(&MessageBody {
                message: packet.to_string(),
            })
            .send()
            .await
            .map_err(|e| EndpointError::Forward {
                port,
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(EndpointError::Forward {
                port,
                reason: format!("status {}", resp.status()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_stores_verbatim() {
        let user = UserNode::new(42, NetworkConfig::default()).unwrap();
        user.receive("hello").await;
        user.receive("0000003000:not:decrypted").await;

        assert_eq!(
            user.last().await.received.as_deref(),
            Some("0000003000:not:decrypted")
        );
    }

    #[tokio::test]
    async fn fresh_endpoint_has_empty_slots() {
        let user = UserNode::new(1, NetworkConfig::default()).unwrap();
        let last = user.last().await;
        assert_eq!(last.sent, None);
        assert_eq!(last.received, None);
        assert!(last.circuit.is_empty());
    }
}
