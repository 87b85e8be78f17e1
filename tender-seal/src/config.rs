//! Configuration types for the sealing keys.
//!
//! Keys are referenced by an opaque identifier stored with every envelope, so
//! rotating to a new key only means adding it and changing `active_key`; the
//! old key must stay configured for as long as envelopes sealed under it have
//! not been opened.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for the sealing keyring.
///
/// # Examples
///
/// ```
/// use tender_seal::config::SealConfig;
///
/// let config = SealConfig {
///     active_key: "2026-q1".to_owned(),
///     keys: [(
///         "2026-q1".to_owned(),
///         "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff".to_owned(),
///     )]
///     .into(),
/// };
/// assert!(tender_seal::Keyring::from_config(&config).is_ok());
/// ```
#[derive(Clone, Deserialize, Serialize)]
pub struct SealConfig {
    /// The key id new envelopes are sealed under
    #[serde(default = "default_active_key")]
    pub active_key: String,

    /// Every key that may still be needed to unseal, as 64 hex characters
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

fn default_active_key() -> String {
    "default".to_owned()
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            active_key: default_active_key(),
            keys: BTreeMap::new(),
        }
    }
}

// The hex strings are key material, so only the ids are shown.
impl std::fmt::Debug for SealConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealConfig")
            .field("active_key", &self.active_key)
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
