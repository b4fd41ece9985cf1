//! The unheadered per-entry key wrapper.
//!
//! Each band entry carries its 64-byte item key sealed under the master key
//! in a bare `16-byte IV | ciphertext | 32-byte HMAC` layout. Unlike
//! [`opdata01`](super::opdata) there is no magic and no length field; the
//! plaintext length is exactly the ciphertext length and the caller
//! enforces the 64-byte size.

use crate::crypto::{self, KeyPair};
use crate::error::{Error, Result};

const IV_SIZE: usize = 16;
const HMAC_SIZE: usize = 32;
const MIN_SIZE: usize = IV_SIZE + HMAC_SIZE;

/// Decrypts and authenticates a raw key blob.
///
/// The HMAC-SHA-256 tag covers `IV || ciphertext` and is verified before
/// decryption. The raw plaintext is returned without any trimming.
pub fn decrypt(blob: &[u8], key: &KeyPair) -> Result<Vec<u8>> {
    if blob.len() < MIN_SIZE {
        return Err(Error::format("key blob is too short"));
    }

    let (body, tag) = blob.split_at(blob.len() - HMAC_SIZE);
    crypto::verify_hmac(key.mac(), &[body], tag)?;

    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&body[..IV_SIZE]);

    let ciphertext = &body[IV_SIZE..];
    if ciphertext.is_empty() || ciphertext.len() % crypto::BLOCK_SIZE != 0 {
        return Err(Error::format(
            "key blob ciphertext is not a nonzero multiple of the block size",
        ));
    }

    crypto::decrypt_cbc(key.enc(), &iv, ciphertext)
}
