//! Shared fixtures: share links, encrypted attributes and encrypted content
//! built with the crate's own codecs.

#![allow(dead_code)]

use std::net::TcpListener;

use megalink::base64::base64url_encode;
use megalink::crypto::{aes128_ecb_encrypt, pack_file_key, AesCtr, MacVerifier};
use megalink::fs::{encrypt_attributes, FileAttributes};
use megalink::ClientConfig;
use serde_json::{json, Value};

pub const FILE_HANDLE: &str = "FiLeHa01";
pub const FOLDER_HANDLE: &str = "FoLdEr01";

pub const CONTENT_KEY: [u8; 16] = [0x11; 16];
pub const NONCE: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
pub const MASTER_KEY: [u8; 16] = [0x77; 16];

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn config_for(server: &httpmock::MockServer) -> ClientConfig {
    ClientConfig::default().with_api_url(server.base_url())
}

pub fn counter_block() -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[..8].copy_from_slice(&NONCE);
    iv
}

pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

pub fn encrypt_content(plain: &[u8]) -> Vec<u8> {
    let mut data = plain.to_vec();
    AesCtr::new(&CONTENT_KEY, &counter_block()).apply_keystream(&mut data);
    data
}

pub fn content_mac(plain: &[u8]) -> [u8; 8] {
    let mut verifier = MacVerifier::new(&CONTENT_KEY, &NONCE);
    verifier.update(plain);
    verifier.finalize()
}

pub fn attributes(key: &[u8; 16], name: &str) -> String {
    encrypt_attributes(
        key,
        &FileAttributes {
            name: name.to_string(),
        },
    )
    .expect("encrypt attributes")
}

/// A legacy-form file link for [`CONTENT_KEY`], [`NONCE`] and `mac`.
pub fn file_link(mac: &[u8; 8]) -> String {
    let packed = pack_file_key(&CONTENT_KEY, &NONCE, mac);
    format!("https://mega.nz/#!{}!{}", FILE_HANDLE, base64url_encode(&packed))
}

pub fn folder_link() -> String {
    format!(
        "https://mega.nz/folder/{}#{}",
        FOLDER_HANDLE,
        base64url_encode(&MASTER_KEY)
    )
}

/// A folder node as the listing returns it.
pub fn folder_node(hash: &str, parent: &str, key: &[u8; 16], name: &str) -> Value {
    let enc = aes128_ecb_encrypt(key, &MASTER_KEY).expect("encrypt key");
    json!({
        "h": hash, "p": parent, "u": "OwNeR001", "t": 1,
        "a": attributes(key, name),
        "k": format!("OwNeR001:{}", base64url_encode(&enc)),
        "ts": 1_700_000_000, "s": 0
    })
}

/// A file node encrypted with [`CONTENT_KEY`] and [`NONCE`].
pub fn file_node(hash: &str, parent: &str, name: &str, size: u64, mac: &[u8; 8]) -> Value {
    let packed = pack_file_key(&CONTENT_KEY, &NONCE, mac);
    let enc = aes128_ecb_encrypt(&packed, &MASTER_KEY).expect("encrypt key");
    json!({
        "h": hash, "p": parent, "u": "OwNeR001", "t": 0,
        "a": attributes(&CONTENT_KEY, name),
        "k": format!("OwNeR001:{}", base64url_encode(&enc)),
        "ts": 1_700_000_000, "s": size, "fa": "924:1*abcdefgh"
    })
}
