use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use peelnet_core::{MessageBody, NetworkConfig, NodeId, NodeInfo, PacketError, PeeledLayer};
use peelnet_crypto::{peel_layer, EncryptionKeypair, PeelError};
use peelnet_directory::{DirectoryClient, DirectoryError};

// A stalled downstream hop fails the chain after this long instead of
// blocking it forever.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Peel(#[from] PeelError),

    #[error(transparent)]
    Malformed(#[from] PacketError),

    #[error("forward to port {port} failed: {reason}")]
    Forward { port: u32, reason: String },

    #[error("directory registration failed: {0}")]
    Registration(#[from] DirectoryError),

    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Last-observed-value slots, overwritten on every ingress that reaches
/// the corresponding step. Exposed for external inspection only; the
/// protocol logic never reads them.
#[derive(Debug, Clone, Default)]
pub struct LastObserved {
    pub encrypted_in: Option<String>,
    pub decrypted_out: Option<String>,
    pub forward_target: Option<u32>,
}

/// State of one relay process: its identity, its keypair, and the
/// introspection slots.
pub struct RelayNode {
    node_id: NodeId,
    cfg: NetworkConfig,
    keypair: EncryptionKeypair,
    http: reqwest::Client,
    last: Mutex<LastObserved>,
}

impl RelayNode {
    pub fn new(node_id: NodeId, cfg: NetworkConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(FORWARD_TIMEOUT)
            .build()?;
        Ok(Self {
            node_id,
            cfg,
            keypair: EncryptionKeypair::generate(),
            http,
            last: Mutex::new(LastObserved::default()),
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn port(&self) -> u32 {
        self.cfg.relay_port(self.node_id)
    }

    pub fn public_key_b64(&self) -> String {
        self.keypair.public_key_b64()
    }

    /// Exported private key for the diagnostic introspection route.
    pub fn private_key_b64(&self) -> String {
        self.keypair.secret_key_b64()
    }

    pub async fn last(&self) -> LastObserved {
        self.last.lock().await.clone()
    }

    /// Announce this relay's identity and public key to the directory.
    pub async fn register(&self, directory: &DirectoryClient) -> Result<(), RelayError> {
        directory
            .register_node(&NodeInfo::new(self.node_id, self.public_key_b64()))
            .await?;
        tracing::info!(node_id = self.node_id, "registered with directory");
        Ok(())
    }

    /// Peel one layer and forward the remainder.
    ///
    /// The raw input is recorded before parsing; the decrypted layer is
    /// recorded before the destination is parsed; the forward target is
    /// recorded before the downstream call. A failure at any step leaves
    /// the later slots untouched. The response to our own caller is not
    /// produced until the downstream forward resolves.
    pub async fn ingress(&self, raw: &str) -> Result<(), RelayError> {
        self.last.lock().await.encrypted_in = Some(raw.to_string());

        let layer = peel_layer(&self.keypair.secret_key_bytes(), raw)?;
        self.last.lock().await.decrypted_out = Some(layer.clone());

        let peeled = PeeledLayer::parse(&layer)?;
        self.last.lock().await.forward_target = Some(peeled.destination);

        tracing::debug!(
            node_id = self.node_id,
            destination = peeled.destination,
            "peeled one layer, forwarding"
        );
        self.forward(peeled.destination, &peeled.inner).await
    }

    async fn forward(&self, port: u32, message: &str) -> Result<(), RelayError> {
        let url = format!("http://127.0.0.1:{port}/message");
        let resp = self
            .http
            .post(&url)
            .json(&MessageBody {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| RelayError::Forward {
                port,
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(RelayError::Forward {
                port,
                reason: format!("status {}", resp.status()),
            });
        }
        Ok(())
    }
}
