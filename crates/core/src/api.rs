//! Request and response bodies shared across the HTTP APIs.

use serde::{Deserialize, Serialize};

use crate::{NodeInfo, UserId};

/// Body of `POST /message` on relays and users: one raw packet or plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Body of `POST /sendMessage` on a user endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub message: String,
    pub destination_user_id: UserId,
}

/// Body of `GET /getNodeRegistry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub nodes: Vec<NodeInfo>,
}

/// Envelope for every introspection read: `{ "result": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

impl<T> ResultResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_body_wire_field_names() {
        let body: SendMessageBody =
            serde_json::from_str(r#"{"message":"hi","destinationUserId":42}"#).unwrap();
        assert_eq!(body.message, "hi");
        assert_eq!(body.destination_user_id, 42);
    }

    #[test]
    fn result_envelope_serializes_null_for_none() {
        let json = serde_json::to_string(&ResultResponse::new(None::<String>)).unwrap();
        assert_eq!(json, r#"{"result":null}"#);
    }
}
