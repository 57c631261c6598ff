//! ID generation utilities.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Length of an issue identifier in hex characters.
pub const ID_LEN: usize = 40;

// ============================================================================
// ID Generation
// ============================================================================

/// Generate a unique issue identifier.
///
/// The identifier is the first 40 hex characters of a SHA256 digest over
/// the creation fields plus a nonce. The `exists` closure checks for
/// collisions; the nonce is bumped until it reports a free id.
pub fn generate_id<F>(
    title: &str,
    description: Option<&str>,
    creator: Option<&str>,
    created_at: DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u32;
    loop {
        let seed = generate_id_seed(title, description, creator, created_at, nonce);
        let id = compute_id_hash(&seed);
        if !exists(&id) {
            return id;
        }
        nonce = nonce.wrapping_add(1);
    }
}

fn generate_id_seed(
    title: &str,
    description: Option<&str>,
    creator: Option<&str>,
    created_at: DateTime<Utc>,
    nonce: u32,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        title,
        description.unwrap_or(""),
        creator.unwrap_or(""),
        created_at.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();

    let mut encoded = String::with_capacity(ID_LEN);
    for byte in result.iter().take(ID_LEN / 2) {
        let _ = write!(encoded, "{byte:02x}");
    }
    encoded
}

/// Whether `id` has the shape of a generated identifier.
#[must_use]
pub fn is_valid_id_format(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
