//! Control-channel encryption state
//!
//! Holds the key negotiated through `ENCR` and runs whole control messages
//! through the injected cipher while a key is installed.

use std::sync::Arc;

use log::debug;

use crate::crypto::Cipher;
use crate::error::{CipherError, ProtocolError};
use crate::protocol::Reply;

/// Public key material announced by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub exponent: String,
    pub modulus: String,
    pub block_size: usize,
}

impl KeyMaterial {
    /// Reads `exponent,modulus,block_size` from the second token of an
    /// `ENCR` reply.
    pub fn from_reply(reply: &Reply) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedKeyMaterial(reply.text.clone());

        let field = reply.text.split_whitespace().nth(1).ok_or_else(malformed)?;
        let parts: Vec<&str> = field.split(',').collect();
        let [exponent, modulus, block_size] = parts.as_slice() else {
            return Err(malformed());
        };

        if exponent.is_empty() || modulus.is_empty() {
            return Err(malformed());
        }
        let block_size: usize = block_size.parse().map_err(|_| malformed())?;
        if block_size == 0 {
            return Err(malformed());
        }

        Ok(Self {
            exponent: exponent.to_string(),
            modulus: modulus.to_string(),
            block_size,
        })
    }
}

/// Encryption applied to the control channel.
///
/// With no key installed both directions pass text through unchanged.
pub struct EncryptionLayer {
    cipher: Arc<dyn Cipher>,
    key: Option<KeyMaterial>,
}

impl EncryptionLayer {
    pub fn new(cipher: Arc<dyn Cipher>) -> Self {
        Self { cipher, key: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.key.as_ref()
    }

    pub fn install(&mut self, key: KeyMaterial) {
        debug!(
            "Installing control channel key (modulus {}, block size {})",
            key.modulus, key.block_size
        );
        self.key = Some(key);
    }

    pub fn clear(&mut self) -> Option<KeyMaterial> {
        self.key.take()
    }

    pub fn encode(&self, plaintext: &str) -> Result<String, CipherError> {
        match &self.key {
            Some(key) => self.cipher.encode(plaintext, key),
            None => Ok(plaintext.to_string()),
        }
    }

    pub fn decode(&self, ciphertext: &str) -> Result<String, CipherError> {
        match &self.key {
            Some(key) => self.cipher.decode(ciphertext, key),
            None => Ok(ciphertext.to_string()),
        }
    }
}
