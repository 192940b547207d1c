use std::time::Duration;

use thiserror::Error;

use peelnet_core::{NetworkConfig, NodeInfo, RegistryResponse};

// Bounded so a dead registry fails a send instead of stalling it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("registry rejected request: status {0}")]
    Rejected(u16),
}

/// HTTP client for the directory service, used by relays to register and
/// by endpoints to fetch the node snapshot.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(cfg: &NetworkConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: format!("http://127.0.0.1:{}", cfg.registry_port),
        })
    }

    pub async fn register_node(&self, node: &NodeInfo) -> Result<(), DirectoryError> {
        let resp = self
            .http
            .post(format!("{}/registerNode", self.base_url))
            .json(node)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(DirectoryError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }

    pub async fn fetch_registry(&self) -> Result<Vec<NodeInfo>, DirectoryError> {
        let resp = self
            .http
            .get(format!("{}/getNodeRegistry", self.base_url))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(DirectoryError::Rejected(resp.status().as_u16()));
        }
        Ok(resp.json::<RegistryResponse>().await?.nodes)
    }
}
