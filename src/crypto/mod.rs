//! Control-channel encryption
//!
//! Key negotiation state for the `ENCR` extension and the pluggable cipher.

pub mod cipher;
pub mod encryption;

pub use cipher::{Cipher, RsaBlockCipher};
pub use encryption::{EncryptionLayer, KeyMaterial};
