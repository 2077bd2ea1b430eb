//! Cryptographic operations for the MEGA sharing protocol.

pub mod aes;
pub mod keys;
pub mod mac;

pub use self::aes::*;
pub use self::keys::*;
pub use self::mac::MacVerifier;
