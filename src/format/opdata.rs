//! The `opdata01` authenticated container.
//!
//! Layout:
//!
//! ```text
//! "opdata01" | u64_le content length | 16-byte IV | ciphertext | 32-byte HMAC
//! ```
//!
//! The HMAC-SHA-256 tag covers everything before it (header, length, IV and
//! ciphertext) and is verified before any decryption. The plaintext is
//! front-padded to a full AES block; the recorded content length is
//! authoritative for trimming, so trailing padding bytes are never trusted.

use crate::crypto::{self, KeyPair};
use crate::error::{Error, Result};

/// Magic bytes opening every container.
pub const MAGIC: &[u8; 8] = b"opdata01";

const LENGTH_SIZE: usize = 8;
const IV_SIZE: usize = 16;
const HMAC_SIZE: usize = 32;
const MIN_SIZE: usize = MAGIC.len() + LENGTH_SIZE + IV_SIZE + HMAC_SIZE;

/// Decrypts and authenticates an `opdata01` blob.
///
/// Verification order is fixed: structural checks on the frame, then the
/// HMAC over the raw bytes, and only then AES-256-CBC decryption and
/// length-based trimming. A tampered blob fails with
/// [`Error::IntegrityFailure`] before the ciphertext reaches the cipher.
pub fn decrypt(blob: &[u8], key: &KeyPair) -> Result<Vec<u8>> {
    if blob.len() < MIN_SIZE {
        return Err(Error::format("opdata01 blob is too short"));
    }
    if &blob[..MAGIC.len()] != MAGIC {
        return Err(Error::format("expected opdata01 header"));
    }

    let (body, tag) = blob.split_at(blob.len() - HMAC_SIZE);
    crypto::verify_hmac(key.mac(), &[body], tag)?;

    let mut len_bytes = [0u8; LENGTH_SIZE];
    len_bytes.copy_from_slice(&body[MAGIC.len()..MAGIC.len() + LENGTH_SIZE]);
    let content_len = u64::from_le_bytes(len_bytes);

    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&body[MAGIC.len() + LENGTH_SIZE..MAGIC.len() + LENGTH_SIZE + IV_SIZE]);

    let ciphertext = &body[MAGIC.len() + LENGTH_SIZE + IV_SIZE..];
    if ciphertext.is_empty() || ciphertext.len() % crypto::BLOCK_SIZE != 0 {
        return Err(Error::format(
            "opdata01 ciphertext is not a nonzero multiple of the block size",
        ));
    }

    let mut plaintext = crypto::decrypt_cbc(key.enc(), &iv, ciphertext)?;
    if content_len > plaintext.len() as u64 {
        return Err(Error::format("not enough content in opdata01"));
    }
    let content_len = content_len as usize;

    // Plaintext is padded at the front up to a block boundary; a length
    // that is already a multiple of the block size gets one full block.
    let padding = match content_len % crypto::BLOCK_SIZE {
        0 => crypto::BLOCK_SIZE,
        rem => crypto::BLOCK_SIZE - rem,
    };
    if plaintext.len() - content_len != padding {
        return Err(Error::format("opdata01 content length mismatch"));
    }

    plaintext.drain(..padding);
    Ok(plaintext)
}


#[cfg(test)]
mod tests {
    use super::testseal::seal;
    use super::*;

    fn test_key() -> KeyPair {
        let mut secret = [0u8; 64];
        for (i, b) in secret.iter_mut().enumerate() {
            *b = i as u8 ^ 0x3C;
        }
        KeyPair::from_secret(&secret)
    }

    #[test]
    fn test_roundtrip() {
        let key = test_key();
        let content = b"{\"title\":\"Personal\"}";
        let blob = seal(content, &key);
        assert_eq!(decrypt(&blob, &key).unwrap(), content);
    }

    #[test]
    fn test_empty_content_is_legal() {
        let key = test_key();
        let blob = seal(b"", &key);
        // A zero-length payload still carries one full padding block.
        assert_eq!(blob.len(), 64 + 16);
        assert_eq!(decrypt(&blob, &key).unwrap(), b"");
    }

    #[test]
    fn test_block_aligned_content_strips_full_block() {
        let key = test_key();
        let content = [0x42u8; 32];
        let blob = seal(&content, &key);
        assert_eq!(decrypt(&blob, &key).unwrap(), content);
    }

    #[test]
    fn test_too_short_is_format_error() {
        let key = test_key();
        for len in 0..64 {
            let err = decrypt(&vec![0u8; len], &key).unwrap_err();
            assert!(matches!(err, Error::InvalidFormat(_)), "len {len}");
        }
    }

    #[test]
    fn test_wrong_magic_is_format_error() {
        let key = test_key();
        let mut blob = seal(b"payload", &key);
        blob[0] = b'x';
        let err = decrypt(&blob, &key).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_any_bit_flip_is_integrity_failure() {
        let key = test_key();
        let blob = seal(b"sixteen byte msg", &key);

        // Flipping any single bit anywhere past the magic must trip the
        // MAC, never produce garbage plaintext or a format error.
        for byte in MAGIC.len()..blob.len() {
            let mut tampered = blob.clone();
            tampered[byte] ^= 0x01;
            let err = decrypt(&tampered, &key).unwrap_err();
            assert!(matches!(err, Error::IntegrityFailure), "byte {byte}");
        }
    }

    #[test]
    fn test_wrong_key_is_integrity_failure() {
        let key = test_key();
        let blob = seal(b"payload", &key);
        let other = KeyPair::from_secret(&[0x77u8; 64]);
        let err = decrypt(&blob, &other).unwrap_err();
        assert!(matches!(err, Error::IntegrityFailure));
    }

    #[test]
    fn test_oversized_content_len_is_format_error() {
        let key = test_key();
        let mut blob = seal(b"payload", &key);
        // Rewrite the length field and re-authenticate so only the length
        // check can reject the blob.
        blob[8..16].copy_from_slice(&1024u64.to_le_bytes());
        let tag = testseal::hmac_sha256(key.mac(), &[&blob[..blob.len() - 32]]);
        let len = blob.len();
        blob[len - 32..].copy_from_slice(&tag);

        let err = decrypt(&blob, &key).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_inconsistent_content_len_is_format_error() {
        let key = test_key();
        // Two blocks of plaintext but a length claiming a single byte.
        let mut blob = seal(&[0x11u8; 17], &key);
        blob[8..16].copy_from_slice(&1u64.to_le_bytes());
        let tag = testseal::hmac_sha256(key.mac(), &[&blob[..blob.len() - 32]]);
        let len = blob.len();
        blob[len - 32..].copy_from_slice(&tag);

        let err = decrypt(&blob, &key).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
