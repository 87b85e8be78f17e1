use crate::models::SealedEnvelope;

/// Authenticated encryption of offer payloads.
///
/// Sealing and unsealing are CPU-bound and synchronous. Any error from
/// `unseal` means the envelope cannot be trusted: tampered, corrupted, or
/// sealed under a key that is not available.
pub trait Sealer: Send + Sync {
    /// Error type for sealing failures
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encrypt `plaintext` under the currently active key.
    fn seal(&self, plaintext: &[u8]) -> Result<SealedEnvelope, Self::Error>;

    /// Verify and decrypt an envelope.
    fn unseal(&self, envelope: &SealedEnvelope) -> Result<Vec<u8>, Self::Error>;
}
