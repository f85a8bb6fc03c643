//! Excavate Crypto - Identities handed to the mint layer
//!
//! Provides:
//! - Opaque base58 on-chain addresses
//! - Fresh Ed25519 asset signers, one per mint

pub mod address;
pub mod identity;

pub use address::*;
pub use identity::*;
