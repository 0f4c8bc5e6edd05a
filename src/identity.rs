// src/identity.rs
use tracing::{debug, info, warn};

use crate::config::{ConfigStore, PulseConfig};
use crate::error::Result;
use crate::token::{derive_public_id, generate_secret, PublicIdentifier, SecretCredential};

/// How the credential pair came to be on this start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Loaded,
    Generated,
    /// The stored token was malformed and has been replaced.
    Regenerated,
}

/// The instance's credential pair. The public id is always derived from the
/// secret held here; there is no way to set it independently.
#[derive(Debug, Clone)]
pub struct InstanceIdentity {
    secret: SecretCredential,
    public_id: PublicIdentifier,
}

impl InstanceIdentity {
    pub fn new(secret: SecretCredential) -> Self {
        let public_id = derive_public_id(&secret);
        Self { secret, public_id }
    }

    pub fn generate() -> Self {
        Self::new(generate_secret())
    }

    pub fn secret(&self) -> &SecretCredential {
        &self.secret
    }

    pub fn public_id(&self) -> &PublicIdentifier {
        &self.public_id
    }

    /// Loads the token from `config`, regenerating and persisting through
    /// `store` when it is missing or malformed. `config.token` is updated in
    /// place to match what was stored.
    pub fn establish(
        store: &dyn ConfigStore,
        config: &mut PulseConfig,
    ) -> Result<(Self, IdentitySource)> {
        if config.token.is_empty() {
            let identity = Self::issue(store, config)?;
            return Ok((identity, IdentitySource::Generated));
        }

        match SecretCredential::parse(&config.token) {
            Some(secret) => {
                let identity = Self::new(secret);
                debug!(public_id = %identity.public_id, "loaded token");
                Ok((identity, IdentitySource::Loaded))
            }
            None => {
                warn!("invalid secret token format in config, generating a new one; existing badge URLs stop working");
                let identity = Self::issue(store, config)?;
                Ok((identity, IdentitySource::Regenerated))
            }
        }
    }

    fn issue(store: &dyn ConfigStore, config: &mut PulseConfig) -> Result<Self> {
        let identity = Self::generate();

        // persist the stored fields only; env overrides stay out of the file
        let mut stored = store.load()?;
        stored.token = identity.secret.expose().to_string();
        store.save(&stored)?;
        config.token = stored.token;

        info!(public_id = %identity.public_id, "generated new secret token; keep it private and use the public id in badge URLs");
        Ok(identity)
    }
}
