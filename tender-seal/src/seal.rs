use crate::keyring::{KeyError, KeyResolver};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore as _;
use tender_core::{models::SealedEnvelope, ports::Sealer};
use thiserror::Error;

/// XChaCha20 uses a 192-bit nonce, large enough to draw at random.
pub const NONCE_LEN: usize = 24;

/// Errors from sealing or unsealing.
///
/// None of the variants carry key material, ciphertext or plaintext.
#[derive(Debug, Error)]
pub enum SealError {
    /// The active key could not be resolved while sealing
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The cipher refused to encrypt
    #[error("encryption failed")]
    EncryptionFailed,

    /// The envelope did not authenticate: tampered, corrupted, sealed under
    /// a different key or under a key id the keyring does not hold
    #[error("decryption failed")]
    DecryptionFailed,
}

/// The sealing component.
///
/// Stateless apart from its key resolver; safe to share between the request
/// handlers and the scheduler.
#[derive(Clone, Debug)]
pub struct Seal<K> {
    keys: K,
}

impl<K: KeyResolver> Seal<K> {
    /// Create a sealing component resolving keys through `keys`
    pub fn new(keys: K) -> Self {
        Self { keys }
    }
}

impl<K: KeyResolver> Sealer for Seal<K> {
    type Error = SealError;

    fn seal(&self, plaintext: &[u8]) -> Result<SealedEnvelope, SealError> {
        let key_id = self.keys.active_key_id();
        let key = self.keys.resolve_key(key_id)?;
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        // The key id is bound as associated data, so relabeling an envelope
        // with another id makes it fail to authenticate.
        let ciphertext = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: key_id.as_bytes(),
                },
            )
            .map_err(|_| SealError::EncryptionFailed)?;

        Ok(SealedEnvelope {
            ciphertext,
            nonce: nonce.to_vec(),
            key_id: key_id.to_owned(),
        })
    }

    fn unseal(&self, envelope: &SealedEnvelope) -> Result<Vec<u8>, SealError> {
        // `XNonce::from_slice` panics on a wrong length, which corrupted rows can have
        if envelope.nonce.len() != NONCE_LEN {
            return Err(SealError::DecryptionFailed);
        }

        // An unknown key id is indistinguishable from a relabeled envelope
        let key = self
            .keys
            .resolve_key(&envelope.key_id)
            .map_err(|_| SealError::DecryptionFailed)?;
        let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

        cipher
            .decrypt(
                XNonce::from_slice(&envelope.nonce),
                Payload {
                    msg: &envelope.ciphertext,
                    aad: envelope.key_id.as_bytes(),
                },
            )
            .map_err(|_| SealError::DecryptionFailed)
    }
}
