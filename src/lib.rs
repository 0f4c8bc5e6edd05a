// src/lib.rs
pub mod badge;
pub mod config;
pub mod delivery;
pub mod error;
pub mod heartbeat;
pub mod identity;
pub mod metrics;
pub mod token;
pub mod types;
pub mod validator;

pub use badge::{BadgeKind, BadgeUrlBuilder};
pub use config::{ConfigStore, FileConfigStore, MemoryConfigStore, PulseConfig};
pub use delivery::{Completion, DeliveryWorker, HttpTransport, Transport};
pub use error::{PulseError, Result};
pub use heartbeat::{DispatchState, HeartbeatDispatcher, HeartbeatHandle, HeartbeatSettings, HeartbeatStatus};
pub use identity::{IdentitySource, InstanceIdentity};
pub use metrics::{MetricsSource, StaticMetrics};
pub use token::{derive_public_id, generate_secret, PublicIdentifier, SecretCredential};
pub use types::{DeliveryResult, HeartbeatData, HeartbeatPayload};
pub use validator::is_valid_secret;
