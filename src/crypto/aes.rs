//! AES-128 encryption operations.
//!
//! MEGA uses AES-128 in three modes:
//! - ECB: node keys encrypted with the folder key
//! - CBC (zero IV): node attributes
//! - CTR: file content

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::error::{MegaError, Result};

const BLOCK: usize = 16;

fn check_block_len(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK != 0 {
        return Err(MegaError::Decode(format!(
            "data length must be a multiple of 16, got {}",
            data.len()
        )));
    }
    Ok(())
}

/// AES-128-ECB encrypt a single 16-byte block.
pub fn aes128_ecb_encrypt_block(data: &[u8; 16], key: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut block = GenericArray::clone_from_slice(data);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// AES-128-ECB encrypt multiple blocks.
///
/// Fails with [`MegaError::Decode`] if the length is not a multiple of 16.
pub fn aes128_ecb_encrypt(data: &[u8], key: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_len(data)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut result = data.to_vec();
    for chunk in result.chunks_mut(BLOCK) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(result)
}

/// AES-128-ECB decrypt multiple blocks, each block independently.
///
/// Fails with [`MegaError::Decode`] if the length is not a multiple of 16.
pub fn aes128_ecb_decrypt(data: &[u8], key: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_len(data)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut result = data.to_vec();
    for chunk in result.chunks_mut(BLOCK) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(result)
}

/// AES-128-CBC decrypt with an all-zero IV.
pub fn aes128_cbc_decrypt(data: &[u8], key: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_len(data)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut result = Vec::with_capacity(data.len());
    let mut prev = [0u8; BLOCK];

    for chunk in data.chunks(BLOCK) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        result.extend_from_slice(&block);
        prev.copy_from_slice(chunk);
    }

    Ok(result)
}

/// AES-128-CBC encrypt with an all-zero IV.
pub fn aes128_cbc_encrypt(data: &[u8], key: &[u8; 16]) -> Result<Vec<u8>> {
    check_block_len(data)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut result = Vec::with_capacity(data.len());
    let mut prev = GenericArray::from([0u8; BLOCK]);

    for chunk in data.chunks(BLOCK) {
        let mut block = GenericArray::clone_from_slice(chunk);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(&mut block);
        result.extend_from_slice(&block);
        prev = block;
    }

    Ok(result)
}

/// Incremental AES-128-CTR keystream.
///
/// The 16-byte counter block is incremented as a big-endian 128-bit integer
/// after each block of keystream. Data may be fed in pieces of any size; the
/// keystream position carries over between calls, so applying it twice with
/// fresh instances restores the input.
pub struct AesCtr {
    cipher: Aes128,
    counter: [u8; BLOCK],
    keystream: [u8; BLOCK],
    used: usize,
}

impl AesCtr {
    /// Create a keystream from a key and an initial counter block.
    pub fn new(key: &[u8; 16], counter: &[u8; 16]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            counter: *counter,
            keystream: [0u8; BLOCK],
            used: BLOCK,
        }
    }

    /// XOR the next `data.len()` bytes of keystream into `data`.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.used == BLOCK {
                self.refill();
            }
            *byte ^= self.keystream[self.used];
            self.used += 1;
        }
    }

    fn refill(&mut self) {
        let mut block = GenericArray::clone_from_slice(&self.counter);
        self.cipher.encrypt_block(&mut block);
        self.keystream.copy_from_slice(&block);
        self.used = 0;

        for byte in self.counter.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }
}
