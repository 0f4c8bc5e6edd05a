// src/validator.rs
use crate::token::SECRET_PREFIX;

/// Shortest string that can still be worth pattern-matching.
pub const MIN_SECRET_LEN: usize = 40;

const UUID_LEN: usize = 36;
const HYPHENS: [usize; 4] = [8, 13, 18, 23];
const VERSION_AT: usize = 14;
const VARIANT_AT: usize = 19;

/// Returns true iff `token` is `sk_live_` followed by a canonical hyphenated
/// UUIDv4 (hex digits in either case, nothing trailing).
///
/// This is the only gate deciding whether a persisted credential is trusted.
pub fn is_valid_secret(token: &str) -> bool {
    let Some(uuid) = token.strip_prefix(SECRET_PREFIX) else {
        return false;
    };
    if token.len() < MIN_SECRET_LEN {
        return false;
    }
    is_uuid_v4(uuid)
}

fn is_uuid_v4(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != UUID_LEN {
        return false;
    }

    for (i, b) in bytes.iter().enumerate() {
        let ok = if HYPHENS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        };
        if !ok {
            return false;
        }
    }

    bytes[VERSION_AT] == b'4' && matches!(bytes[VARIANT_AT].to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b')
}
