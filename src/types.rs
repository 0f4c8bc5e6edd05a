// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::SecretCredential;

/// One metrics snapshot as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatData {
    pub status: String,
    pub players: u32,
    pub max_players: u32,
    /// Rounded to two decimals.
    pub tps: f64,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    pub heartbeat_interval_sec: u64,
}

/// `{"token": ..., "data": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatPayload {
    pub token: SecretCredential,
    pub data: HeartbeatData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryResult {
    /// True only for HTTP 200.
    pub success: bool,
    pub code: Option<u16>,
    pub body: Option<String>,
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl DeliveryResult {
    pub fn from_response(code: u16, body: Option<String>) -> Self {
        Self {
            success: code == 200,
            code: Some(code),
            body,
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn from_error(code: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            body: None,
            error: Some(error.into()),
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(software: Option<&str>) -> HeartbeatData {
        HeartbeatData {
            status: "online".into(),
            players: 3,
            max_players: 20,
            tps: 19.87,
            version: "1.21.50".into(),
            software: software.map(str::to_string),
            heartbeat_interval_sec: 60,
        }
    }

    #[test]
    fn payload_wire_shape() {
        let payload = HeartbeatPayload {
            token: SecretCredential::parse("sk_live_550e8400-e29b-41d4-a716-446655440000").unwrap(),
            data: data(Some("PocketMine-MP 5.0.0")),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "token": "sk_live_550e8400-e29b-41d4-a716-446655440000",
                "data": {
                    "status": "online",
                    "players": 3,
                    "maxPlayers": 20,
                    "tps": 19.87,
                    "version": "1.21.50",
                    "software": "PocketMine-MP 5.0.0",
                    "heartbeatIntervalSec": 60
                }
            })
        );
    }

    #[test]
    fn software_omitted_when_absent() {
        let value = serde_json::to_value(data(None)).unwrap();
        assert!(value.get("software").is_none());
    }

    #[test]
    fn only_200_is_success() {
        assert!(DeliveryResult::from_response(200, None).success);
        assert!(!DeliveryResult::from_response(201, None).success);
        assert!(!DeliveryResult::from_response(204, None).success);
        let err = DeliveryResult::from_response(503, Some("down".into()));
        assert!(!err.success);
        assert_eq!(err.body.as_deref(), Some("down"));
        assert_eq!(err.code, Some(503));
    }
}
