//! Condensed content MAC verification.
//!
//! MEGA authenticates file content with a CBC-MAC per chunk. Chunks are
//! 128 KiB, 256 KiB, ... up to 1 MiB for the first eight, then 1 MiB each.
//! Each chunk MAC starts from the nonce repeated twice; the chunk MACs are
//! chained through AES into a file MAC, which is condensed to 8 bytes as
//! `[w0 ^ w1, w2 ^ w3]`.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;

const BLOCK: usize = 16;

/// Size of the chunk at `index` in MEGA's chunk layout.
pub(crate) fn chunk_len(index: usize) -> u64 {
    if index < 8 {
        (index as u64 + 1) * 128 * 1024
    } else {
        1024 * 1024
    }
}

/// Incremental MAC over plaintext, fed in arbitrary slices.
pub struct MacVerifier {
    cipher: Aes128,
    chunk_iv: [u8; BLOCK],
    chunk_index: usize,
    chunk_remaining: u64,
    chunk_mac: [u8; BLOCK],
    block: [u8; BLOCK],
    block_len: usize,
    file_mac: [u8; BLOCK],
    in_chunk: bool,
}

impl MacVerifier {
    /// Create a verifier for content encrypted with `key` and `nonce`.
    pub fn new(key: &[u8; 16], nonce: &[u8; 8]) -> Self {
        let mut chunk_iv = [0u8; BLOCK];
        chunk_iv[..8].copy_from_slice(nonce);
        chunk_iv[8..].copy_from_slice(nonce);

        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            chunk_iv,
            chunk_index: 0,
            chunk_remaining: 0,
            chunk_mac: [0u8; BLOCK],
            block: [0u8; BLOCK],
            block_len: 0,
            file_mac: [0u8; BLOCK],
            in_chunk: false,
        }
    }

    /// Feed the next plaintext bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if !self.in_chunk {
                self.chunk_mac = self.chunk_iv;
                self.chunk_remaining = chunk_len(self.chunk_index);
                self.in_chunk = true;
            }

            let room = (BLOCK - self.block_len) as u64;
            let take = room.min(self.chunk_remaining).min(data.len() as u64) as usize;
            self.block[self.block_len..self.block_len + take].copy_from_slice(&data[..take]);
            self.block_len += take;
            self.chunk_remaining -= take as u64;
            data = &data[take..];

            if self.block_len == BLOCK {
                self.absorb_block();
            }
            if self.chunk_remaining == 0 {
                self.finish_chunk();
            }
        }
    }

    /// Finish the computation and return the condensed 8-byte MAC.
    pub fn finalize(mut self) -> [u8; 8] {
        if self.in_chunk {
            self.finish_chunk();
        }

        let w: Vec<u32> = self
            .file_mac
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let mut condensed = [0u8; 8];
        condensed[..4].copy_from_slice(&(w[0] ^ w[1]).to_be_bytes());
        condensed[4..].copy_from_slice(&(w[2] ^ w[3]).to_be_bytes());
        condensed
    }

    /// Finish and compare against an expected MAC.
    pub fn verify(self, expected: &[u8; 8]) -> bool {
        self.finalize() == *expected
    }

    fn absorb_block(&mut self) {
        for (m, b) in self.chunk_mac.iter_mut().zip(self.block.iter()) {
            *m ^= b;
        }
        self.chunk_mac = self.encrypt(&self.chunk_mac);
        self.block = [0u8; BLOCK];
        self.block_len = 0;
    }

    fn finish_chunk(&mut self) {
        // Partial final block is zero-padded.
        if self.block_len > 0 {
            self.absorb_block();
        }
        for (f, c) in self.file_mac.iter_mut().zip(self.chunk_mac.iter()) {
            *f ^= c;
        }
        self.file_mac = self.encrypt(&self.file_mac);
        self.chunk_index += 1;
        self.in_chunk = false;
    }

    fn encrypt(&self, data: &[u8; BLOCK]) -> [u8; BLOCK] {
        let mut block = GenericArray::clone_from_slice(data);
        self.cipher.encrypt_block(&mut block);
        block.into()
    }
}
