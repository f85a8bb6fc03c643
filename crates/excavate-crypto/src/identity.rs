//! Asset signer generation using Ed25519

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::Address;

/// Freshly generated keypair for a new asset.
///
/// The mint layer uses it as the asset account's signer; one is generated
/// per mint and never reused.
#[derive(Clone)]
pub struct AssetSigner {
    signing_key: SigningKey,
}

impl AssetSigner {
    /// Generate a new random signer
    pub fn generate() -> Self {
        AssetSigner {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Public address of the asset account
    pub fn address(&self) -> Address {
        Address::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Short fingerprint for logs (first 8 bytes of SHA-256 of the address)
    pub fn fingerprint(&self) -> u64 {
        let hash = Sha256::digest(self.address().as_bytes());
        let mut id = [0u8; 8];
        id.copy_from_slice(&hash[..8]);
        u64::from_le_bytes(id)
    }
}

impl std::fmt::Debug for AssetSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
