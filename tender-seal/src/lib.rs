#![warn(missing_docs)]
//! Authenticated sealing of offer payloads.
//!
//! An offer's financial payload is encrypted with XChaCha20-Poly1305 under a
//! 256-bit key at submission time and stays ciphertext until its tender's
//! opening date. The resulting envelope carries the ciphertext, a random
//! 192-bit nonce and the opaque identifier of the key; the key material
//! itself is looked up through a [`KeyResolver`] on every call and is wiped
//! from memory when dropped.
//!
//! ```
//! use tender_core::ports::Sealer as _;
//! use tender_seal::{Keyring, Seal, SecretKey};
//!
//! let seal = Seal::new(Keyring::single("k1", SecretKey::generate()));
//! let envelope = seal.seal(b"{\"total_amount\":\"1000\"}").unwrap();
//! assert_eq!(seal.unseal(&envelope).unwrap(), b"{\"total_amount\":\"1000\"}");
//! ```

pub mod config;

mod keyring;
pub use keyring::{KeyError, KeyResolver, Keyring, SecretKey};

mod seal;
pub use seal::{NONCE_LEN, Seal, SealError};
