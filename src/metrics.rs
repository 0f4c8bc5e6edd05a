// src/metrics.rs
use std::env;

use crate::types::HeartbeatData;

pub const STATUS_ONLINE: &str = "online";

/// The slice of the host the heartbeat needs. Implemented by whatever embeds
/// the beacon; called on the scheduler task, so keep it cheap.
pub trait MetricsSource: Send + Sync {
    fn online_players(&self) -> u32;
    fn max_players(&self) -> u32;
    fn ticks_per_second(&self) -> f64;
    /// Network protocol version string reported as `version`.
    fn protocol_version(&self) -> String;
    fn software_name(&self) -> String;
    fn software_version(&self) -> String;

    fn status(&self) -> String {
        STATUS_ONLINE.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    pub send_software: bool,
    pub interval_secs: u64,
}

pub fn collect(source: &dyn MetricsSource, opts: CollectOptions) -> HeartbeatData {
    let software = opts
        .send_software
        .then(|| format!("{} {}", source.software_name(), source.software_version()));

    HeartbeatData {
        status: source.status(),
        players: source.online_players(),
        max_players: source.max_players(),
        tps: round2(source.ticks_per_second()),
        version: source.protocol_version(),
        software,
        heartbeat_interval_sec: opts.interval_secs,
    }
}

fn round2(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    (v * 100.0).round() / 100.0
}

/// Fixed figures for running the beacon next to a host with no embedded
/// integration.
#[derive(Debug, Clone)]
pub struct StaticMetrics {
    pub name: String,
    pub version: String,
    pub protocol: String,
    pub max_players: u32,
    pub players: u32,
    pub tps: f64,
}

impl Default for StaticMetrics {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol: "unknown".to_string(),
            max_players: 20,
            players: 0,
            tps: 20.0,
        }
    }
}

impl StaticMetrics {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            name: env::var("PULSE_SERVER_NAME").unwrap_or(d.name),
            version: env::var("PULSE_SERVER_VERSION").unwrap_or(d.version),
            protocol: env::var("PULSE_PROTOCOL_VERSION").unwrap_or(d.protocol),
            max_players: env::var("PULSE_MAX_PLAYERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(d.max_players),
            ..d
        }
    }
}

impl MetricsSource for StaticMetrics {
    fn online_players(&self) -> u32 {
        self.players
    }

    fn max_players(&self) -> u32 {
        self.max_players
    }

    fn ticks_per_second(&self) -> f64 {
        self.tps
    }

    fn protocol_version(&self) -> String {
        self.protocol.clone()
    }

    fn software_name(&self) -> String {
        self.name.clone()
    }

    fn software_version(&self) -> String {
        self.version.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> StaticMetrics {
        StaticMetrics {
            name: "PocketMine-MP".into(),
            version: "5.0.0".into(),
            protocol: "1.21.50".into(),
            max_players: 50,
            players: 7,
            tps: 19.876,
        }
    }

    #[test]
    fn collects_snapshot() {
        let data = collect(
            &host(),
            CollectOptions {
                send_software: true,
                interval_secs: 30,
            },
        );
        assert_eq!(data.status, "online");
        assert_eq!(data.players, 7);
        assert_eq!(data.max_players, 50);
        assert_eq!(data.tps, 19.88);
        assert_eq!(data.version, "1.21.50");
        assert_eq!(data.software.as_deref(), Some("PocketMine-MP 5.0.0"));
        assert_eq!(data.heartbeat_interval_sec, 30);
    }

    #[test]
    fn software_can_be_withheld() {
        let data = collect(
            &host(),
            CollectOptions {
                send_software: false,
                interval_secs: 60,
            },
        );
        assert!(data.software.is_none());
    }

    #[test]
    fn rounds_tps() {
        assert_eq!(round2(20.0), 20.0);
        assert_eq!(round2(19.994), 19.99);
        assert_eq!(round2(f64::NAN), 0.0);
    }
}
