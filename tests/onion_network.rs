//! End-to-end overlay tests over loopback HTTP.
//!
//! Each test spawns a registry, relays, and user endpoints on its own
//! port range (tests run in parallel), then drives the network through
//! the public HTTP APIs the way external processes would.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use peelnet_core::{NetworkConfig, NodeId, UserId};
use peelnet_directory::{DirectoryClient, NodeTable};
use peelnet_endpoint::UserNode;
use peelnet_relay::RelayNode;

// =========================================================================
// Harness
// =========================================================================

struct TestNet {
    cfg: NetworkConfig,
    http: reqwest::Client,
}

impl TestNet {
    /// Spawn registry + relays + users and wait until every component
    /// answers `/status`.
    async fn spawn(cfg: NetworkConfig, relay_ids: &[NodeId], user_ids: &[UserId]) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        tokio::spawn(peelnet_directory::serve(NodeTable::new(), cfg));
        wait_live(&http, cfg.registry_port.into()).await;

        for &node_id in relay_ids {
            let node = Arc::new(RelayNode::new(node_id, cfg).unwrap());
            let directory = DirectoryClient::new(&cfg).unwrap();
            node.register(&directory).await.unwrap();
            tokio::spawn(peelnet_relay::serve(node));
        }
        for &user_id in user_ids {
            let user = Arc::new(UserNode::new(user_id, cfg).unwrap());
            tokio::spawn(peelnet_endpoint::serve(user));
        }

        for &node_id in relay_ids {
            wait_live(&http, cfg.relay_port(node_id)).await;
        }
        for &user_id in user_ids {
            wait_live(&http, cfg.user_port(user_id)).await;
        }

        Self { cfg, http }
    }

    async fn send_message(&self, from: UserId, message: &str, to: UserId) -> reqwest::StatusCode {
        self.http
            .post(format!(
                "http://127.0.0.1:{}/sendMessage",
                self.cfg.user_port(from)
            ))
            .json(&json!({ "message": message, "destinationUserId": to }))
            .send()
            .await
            .unwrap()
            .status()
    }

    async fn get_result(&self, port: u32, route: &str) -> Value {
        let body: Value = self
            .http
            .get(format!("http://127.0.0.1:{port}{route}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["result"].clone()
    }
}

async fn wait_live(http: &reqwest::Client, port: u32) {
    for _ in 0..100 {
        if let Ok(resp) = http
            .get(format!("http://127.0.0.1:{port}/status"))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("component on port {port} never came up");
}

fn config(registry: u16, relay_base: u16, user_base: u16) -> NetworkConfig {
    NetworkConfig {
        registry_port: registry,
        base_relay_port: relay_base,
        base_user_port: user_base,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn message_traverses_three_hops_to_receiver() {
    let net = TestNet::spawn(config(18080, 14000, 13000), &[1, 2, 3], &[1, 42]).await;
    let cfg = net.cfg;

    let status = net.send_message(1, "hello", 42).await;
    assert!(status.is_success());

    // Final receiver got exact plaintext.
    let received = net
        .get_result(cfg.user_port(42), "/getLastReceivedMessage")
        .await;
    assert_eq!(received, json!("hello"));

    // Sender recorded the plaintext and a circuit over all three relays.
    let sent = net
        .get_result(cfg.user_port(1), "/getLastSentMessage")
        .await;
    assert_eq!(sent, json!("hello"));

    let circuit: Vec<NodeId> =
        serde_json::from_value(net.get_result(cfg.user_port(1), "/getLastCircuit").await).unwrap();
    let mut sorted = circuit.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3]);

    // Each hop forwarded to the next hop's port; the exit hop forwarded
    // to the receiver.
    for (i, &node_id) in circuit.iter().enumerate() {
        let destination = net
            .get_result(cfg.relay_port(node_id), "/getLastMessageDestination")
            .await;
        let expected = if i == circuit.len() - 1 {
            cfg.user_port(42)
        } else {
            cfg.relay_port(circuit[i + 1])
        };
        assert_eq!(destination, json!(expected), "hop {i} forwarded elsewhere");

        let encrypted = net
            .get_result(cfg.relay_port(node_id), "/getLastReceivedEncryptedMessage")
            .await;
        assert!(encrypted.is_string(), "hop {i} never saw the packet");
    }
}

#[tokio::test]
async fn consecutive_sends_each_arrive() {
    let net = TestNet::spawn(config(19080, 15000, 13500), &[1, 2, 3], &[1, 2]).await;
    let cfg = net.cfg;

    assert!(net.send_message(1, "first", 2).await.is_success());
    assert!(net.send_message(1, "second", 2).await.is_success());

    let received = net
        .get_result(cfg.user_port(2), "/getLastReceivedMessage")
        .await;
    assert_eq!(received, json!("second"));
}

#[tokio::test]
async fn insufficient_nodes_rejects_send_without_delivery() {
    let net = TestNet::spawn(config(28080, 24000, 23000), &[1, 2], &[1, 42]).await;
    let cfg = net.cfg;

    let status = net.send_message(1, "hello", 42).await;
    assert_eq!(status.as_u16(), 500);

    // Nothing was forwarded anywhere.
    let received = net
        .get_result(cfg.user_port(42), "/getLastReceivedMessage")
        .await;
    assert_eq!(received, Value::Null);
    for node_id in [1, 2] {
        let encrypted = net
            .get_result(cfg.relay_port(node_id), "/getLastReceivedEncryptedMessage")
            .await;
        assert_eq!(encrypted, Value::Null);
    }
}

#[tokio::test]
async fn duplicate_registration_keeps_single_entry() {
    let net = TestNet::spawn(config(38080, 34000, 33000), &[], &[]).await;
    let registry_url = format!("http://127.0.0.1:{}", net.cfg.registry_port);

    for key in ["first", "second"] {
        let status = net
            .http
            .post(format!("{registry_url}/registerNode"))
            .json(&json!({ "nodeId": 1, "pubKey": key }))
            .send()
            .await
            .unwrap()
            .status();
        assert!(status.is_success());
    }

    let body: Value = net
        .http
        .get(format!("{registry_url}/getNodeRegistry"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["pubKey"], json!("first"));
}

#[tokio::test]
async fn malformed_registration_is_rejected_before_mutation() {
    let net = TestNet::spawn(config(39080, 35000, 33500), &[], &[]).await;
    let registry_url = format!("http://127.0.0.1:{}", net.cfg.registry_port);

    let status = net
        .http
        .post(format!("{registry_url}/registerNode"))
        .json(&json!({ "nodeId": 7 }))
        .send()
        .await
        .unwrap()
        .status();
    assert!(status.is_client_error());

    let body: Value = net
        .http
        .get(format!("{registry_url}/getNodeRegistry"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["nodes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn relay_rejects_garbage_without_touching_peel_slots() {
    let net = TestNet::spawn(config(48080, 44000, 43000), &[1], &[]).await;
    let relay_port = net.cfg.relay_port(1);

    // No delimiter at all.
    let status = net
        .http
        .post(format!("http://127.0.0.1:{relay_port}/message"))
        .json(&json!({ "message": "nodelimiter" }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status.as_u16(), 400);

    // Delimited but undecryptable; same rejection from the outside.
    let status = net
        .http
        .post(format!("http://127.0.0.1:{relay_port}/message"))
        .json(&json!({ "message": "abc:def" }))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status.as_u16(), 400);

    let encrypted = net
        .get_result(relay_port, "/getLastReceivedEncryptedMessage")
        .await;
    assert_eq!(encrypted, json!("abc:def"));
    let decrypted = net
        .get_result(relay_port, "/getLastReceivedDecryptedMessage")
        .await;
    assert_eq!(decrypted, Value::Null);
    let destination = net
        .get_result(relay_port, "/getLastMessageDestination")
        .await;
    assert_eq!(destination, Value::Null);
}

#[tokio::test]
async fn relay_exposes_its_private_key_for_diagnostics() {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    let net = TestNet::spawn(config(49080, 45000, 43500), &[1], &[]).await;

    let result = net
        .get_result(net.cfg.relay_port(1), "/getPrivateKey")
        .await;
    let key = result.as_str().unwrap();
    assert_eq!(BASE64.decode(key).unwrap().len(), 32);
}

#[tokio::test]
async fn dead_hop_fails_the_whole_chain() {
    // Register a relay id that is never served: the entry hop that draws
    // it as its successor cannot forward, and the failure propagates all
    // the way back to the sender as an error status.
    let cfg = config(50080, 46000, 43800);
    let net = TestNet::spawn(cfg, &[1, 2], &[1, 9]).await;

    // Third node registered but not listening.
    let directory = DirectoryClient::new(&cfg).unwrap();
    let ghost = RelayNode::new(3, cfg).unwrap();
    ghost.register(&directory).await.unwrap();
    drop(ghost);

    let status = net.send_message(1, "hello", 9).await;
    assert!(!status.is_success());

    let received = net
        .get_result(cfg.user_port(9), "/getLastReceivedMessage")
        .await;
    assert_eq!(received, Value::Null);
}
