//! Control-channel cipher capability
//!
//! The cipher is injected into the control channel as a trait object so the
//! primitive can be swapped (or replaced by a test double) without touching
//! the protocol engine.

use crate::crypto::KeyMaterial;
use crate::error::CipherError;

/// Encodes and decodes ASCII control-channel text under a negotiated key.
pub trait Cipher: Send + Sync {
    fn encode(&self, plaintext: &str, key: &KeyMaterial) -> Result<String, CipherError>;
    fn decode(&self, ciphertext: &str, key: &KeyMaterial) -> Result<String, CipherError>;
}

/// Largest block that still packs into a 64-bit integer
const MAX_BLOCK_SIZE: usize = 8;

/// Textbook RSA over 64-bit moduli.
///
/// Plaintext is cut into `block_size`-byte blocks, each packed big-endian into
/// an integer below the modulus and raised to the exponent. Ciphertext is the
/// decimal blocks separated by single spaces. Decoding applies the same
/// public exponent, which inverts blocks the server produced with its private
/// exponent.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaBlockCipher;

impl RsaBlockCipher {
    fn key_numbers(key: &KeyMaterial) -> Result<(u64, u64), CipherError> {
        let exponent: u64 = key
            .exponent
            .parse()
            .map_err(|_| CipherError::InvalidKey(format!("exponent {:?}", key.exponent)))?;
        let modulus: u64 = key
            .modulus
            .parse()
            .map_err(|_| CipherError::InvalidKey(format!("modulus {:?}", key.modulus)))?;

        if modulus < 2 {
            return Err(CipherError::InvalidKey(format!("modulus {}", modulus)));
        }
        if key.block_size == 0 || key.block_size > MAX_BLOCK_SIZE {
            return Err(CipherError::InvalidKey(format!("block size {}", key.block_size)));
        }
        Ok((exponent, modulus))
    }
}

impl Cipher for RsaBlockCipher {
    fn encode(&self, plaintext: &str, key: &KeyMaterial) -> Result<String, CipherError> {
        if !plaintext.is_ascii() {
            return Err(CipherError::NonAscii);
        }
        let (exponent, modulus) = Self::key_numbers(key)?;

        let mut blocks = Vec::new();
        for (idx, chunk) in plaintext.as_bytes().chunks(key.block_size).enumerate() {
            let value = chunk.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
            if value >= modulus {
                return Err(CipherError::BlockExceedsModulus(idx));
            }
            blocks.push(mod_pow(value, exponent, modulus).to_string());
        }
        Ok(blocks.join(" "))
    }

    fn decode(&self, ciphertext: &str, key: &KeyMaterial) -> Result<String, CipherError> {
        let (exponent, modulus) = Self::key_numbers(key)?;
        let limit = 1u128 << (8 * key.block_size);

        let mut bytes = Vec::new();
        for token in ciphertext.split_whitespace() {
            let block: u64 = token
                .parse()
                .map_err(|_| CipherError::InvalidCiphertext(token.to_string()))?;
            if block >= modulus {
                return Err(CipherError::InvalidCiphertext(token.to_string()));
            }

            let value = mod_pow(block, exponent, modulus);
            if u128::from(value) >= limit {
                return Err(CipherError::InvalidCiphertext(token.to_string()));
            }
            bytes.extend(value.to_be_bytes().iter().skip_while(|b| **b == 0));
        }

        if !bytes.is_ascii() {
            return Err(CipherError::NonAscii);
        }
        String::from_utf8(bytes).map_err(|e| CipherError::InvalidCiphertext(e.to_string()))
    }
}

fn mod_pow(base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let m = u128::from(modulus);
    let mut result: u128 = 1 % m;
    let mut base = u128::from(base) % m;

    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * base % m;
        }
        base = base * base % m;
        exponent >>= 1;
    }
    result as u64
}
