use crate::config::SealConfig;
use rand::RngCore as _;
use std::collections::HashMap;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a key in bytes.
const KEY_LEN: usize = 32;

/// A 256-bit key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hex characters.
    pub fn from_hex(key_id: &str, hex_key: &str) -> Result<Self, KeyError> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(hex_key.trim(), &mut bytes)
            .map_err(|_| KeyError::Malformed(key_id.to_owned()))?;
        Ok(Self(bytes))
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Errors from resolving key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// No key is known under the id
    #[error("unknown key id `{0}`")]
    Unknown(String),

    /// The configured key is not 64 hex characters
    #[error("key `{0}` is not 64 hex characters")]
    Malformed(String),

    /// The active key id has no key configured
    #[error("active key `{0}` is not configured")]
    MissingActive(String),
}

/// The key-management collaborator.
///
/// Resolves opaque key ids to key material. Only the sealing component calls
/// this, and only for the duration of a single seal or unseal.
pub trait KeyResolver: Send + Sync {
    /// The id new envelopes are sealed under
    fn active_key_id(&self) -> &str;

    /// Look up the key for `key_id`
    fn resolve_key(&self, key_id: &str) -> Result<SecretKey, KeyError>;
}

/// An in-process keyring, loaded from configuration at startup.
#[derive(Clone, Debug)]
pub struct Keyring {
    active: String,
    keys: HashMap<String, SecretKey>,
}

impl Keyring {
    /// Build a keyring holding exactly one key, which is also the active one.
    pub fn single(key_id: impl Into<String>, key: SecretKey) -> Self {
        let active = key_id.into();
        Self {
            keys: HashMap::from([(active.clone(), key)]),
            active,
        }
    }

    /// Load every configured key, checking that the active one is among them.
    pub fn from_config(config: &SealConfig) -> Result<Self, KeyError> {
        let keys = config
            .keys
            .iter()
            .map(|(id, hex_key)| Ok((id.clone(), SecretKey::from_hex(id, hex_key)?)))
            .collect::<Result<HashMap<_, _>, KeyError>>()?;

        if !keys.contains_key(&config.active_key) {
            return Err(KeyError::MissingActive(config.active_key.clone()));
        }

        tracing::info!(
            active_key = %config.active_key,
            keys = keys.len(),
            "loaded sealing keyring"
        );

        Ok(Self {
            active: config.active_key.clone(),
            keys,
        })
    }

    /// Add (or replace) a key, optionally making it the active one.
    pub fn insert(&mut self, key_id: impl Into<String>, key: SecretKey, activate: bool) {
        let key_id = key_id.into();
        if activate {
            self.active = key_id.clone();
        }
        self.keys.insert(key_id, key);
    }
}

impl KeyResolver for Keyring {
    fn active_key_id(&self) -> &str {
        &self.active
    }

    fn resolve_key(&self, key_id: &str) -> Result<SecretKey, KeyError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| KeyError::Unknown(key_id.to_owned()))
    }
}
