// src/token.rs
use std::fmt;

use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Builder;

use crate::validator::is_valid_secret;

pub const SECRET_PREFIX: &str = "sk_live_";
pub const PUBLIC_PREFIX: &str = "srv_pub_";

/// Hex characters of the digest kept in a public id.
const PUBLIC_HASH_LEN: usize = 12;

/// Private instance token: `sk_live_` + hyphenated UUIDv4.
///
/// Only ever leaves the process inside a heartbeat payload. `Debug` and
/// `Display` are redacted so it cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SecretCredential(String);

impl SecretCredential {
    /// Accepts `raw` only if it passes [`is_valid_secret`].
    pub fn parse(raw: &str) -> Option<Self> {
        is_valid_secret(raw).then(|| Self(raw.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The UUID portion, prefix stripped.
    pub fn uuid_part(&self) -> &str {
        self.0.strip_prefix(SECRET_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Debug for SecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretCredential(sk_live_****)")
    }
}

impl fmt::Display for SecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sk_live_****")
    }
}

/// Public id derived one-way from a [`SecretCredential`]; safe for badge URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PublicIdentifier(String);

impl PublicIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 16 bytes from the OS CSPRNG, stamped as UUID version 4 / RFC 4122 variant.
pub fn generate_secret() -> SecretCredential {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let uuid = Builder::from_random_bytes(bytes).into_uuid();
    SecretCredential(format!("{SECRET_PREFIX}{}", uuid.hyphenated()))
}

pub fn derive_public_id(secret: &SecretCredential) -> PublicIdentifier {
    let digest = Sha256::digest(secret.uuid_part().as_bytes());
    let hash = hex::encode(digest);
    PublicIdentifier(format!("{PUBLIC_PREFIX}{}", &hash[..PUBLIC_HASH_LEN]))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const KNOWN: &str = "sk_live_550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn generated_secret_is_valid() {
        for _ in 0..100 {
            let secret = generate_secret();
            assert_eq!(secret.expose().len(), 44);
            assert!(is_valid_secret(secret.expose()), "{}", secret.expose());
        }
    }

    #[test]
    fn generated_secret_is_lowercase() {
        let secret = generate_secret();
        assert_eq!(secret.expose(), secret.expose().to_lowercase());
    }

    #[test]
    fn generated_secrets_are_unique() {
        let set: HashSet<_> = (0..10).map(|_| generate_secret()).collect();
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn public_id_matches_known_vector() {
        let secret = SecretCredential::parse(KNOWN).unwrap();
        let id = derive_public_id(&secret);
        // sha256("550e8400-e29b-41d4-a716-446655440000") = a3a9e1ed9732cab2...
        assert_eq!(id.as_str(), "srv_pub_a3a9e1ed9732");
    }

    #[test]
    fn public_id_is_deterministic() {
        let secret = generate_secret();
        let first = derive_public_id(&secret);
        for _ in 0..5 {
            assert_eq!(derive_public_id(&secret), first);
        }
        assert_eq!(first.as_str().len(), PUBLIC_PREFIX.len() + PUBLIC_HASH_LEN);
        assert!(first.as_str()[PUBLIC_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn public_id_differs_per_secret() {
        let ids: HashSet<_> = (0..10)
            .map(|_| derive_public_id(&generate_secret()))
            .collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn public_id_does_not_contain_secret() {
        let secret = SecretCredential::parse(KNOWN).unwrap();
        let id = derive_public_id(&secret);
        assert!(!id.as_str().contains(secret.uuid_part()));
        assert!(!id.as_str().contains("550e8400"));
    }

    #[test]
    fn parse_rejects_invalid() {
        assert!(SecretCredential::parse("sk_live_550e8400-e29b-31d4-a716-446655440000").is_none());
        assert!(SecretCredential::parse("").is_none());
    }

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = SecretCredential::parse(KNOWN).unwrap();
        assert!(!format!("{secret:?}").contains("550e8400"));
        assert!(!format!("{secret}").contains("550e8400"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let secret = SecretCredential::parse(KNOWN).unwrap();
        assert_eq!(serde_json::to_string(&secret).unwrap(), format!("\"{KNOWN}\""));
    }
}
