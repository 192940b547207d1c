use serde::{Deserialize, Serialize};

use crate::{NodeId, UserId};

/// Transport addressing for a deployment.
///
/// Every participant is reachable at a deterministic localhost port:
/// the registry at a fixed port, relays at `base_relay_port + node_id`,
/// users at `base_user_port + user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub registry_port: u16,
    pub base_relay_port: u16,
    pub base_user_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            registry_port: 8080,
            base_relay_port: 4000,
            base_user_port: 3000,
        }
    }
}

impl NetworkConfig {
    pub fn relay_port(&self, node_id: NodeId) -> u32 {
        u32::from(self.base_relay_port) + node_id
    }

    pub fn user_port(&self, user_id: UserId) -> u32 {
        u32::from(self.base_user_port) + user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_base_plus_id() {
        let cfg = NetworkConfig::default();
        assert_eq!(cfg.relay_port(3), 4003);
        assert_eq!(cfg.user_port(42), 3042);
    }
}
