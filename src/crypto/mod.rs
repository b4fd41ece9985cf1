//! Cryptographic primitives for OPVault decryption.
//!
//! This module implements the OPVault envelope scheme which uses:
//! - PBKDF2-HMAC-SHA-512 key derivation from the master password
//! - AES-256-CBC for data encryption
//! - HMAC-SHA-256 for authentication (encrypt-then-MAC)
//! - SHA-512 splitting for the unwrapped master and overview keys
//!
//! # Authentication Order
//!
//! Every ciphertext in the format carries an HMAC-SHA-256 tag over the raw
//! encrypted bytes. Callers verify the tag *before* any AES operation
//! touches the ciphertext; the decryption helpers here never inspect
//! padding, so a forged blob is rejected without ever being decrypted.

mod keys;
mod password;

use aes::Aes256;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};
use zeroize::Zeroize;

use crate::error::{Error, Result};

pub use keys::KeyPair;
pub use password::Password;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// AES block size in bytes.
pub(crate) const BLOCK_SIZE: usize = 16;

/// Derives the password key pair from the profile salt.
///
/// Runs PBKDF2-HMAC-SHA-512 over the password and splits the 64-byte output
/// into an AES half and an HMAC half. The password's trailing NUL byte is
/// part of the PBKDF2 input (see [`Password::kdf_bytes`]); dropping it
/// produces a key pair that fails to unwrap any real profile.
///
/// # Arguments
///
/// * `password` - The master password
/// * `salt` - Salt bytes from `profile.js`
/// * `iterations` - PBKDF2 iteration count from `profile.js`
pub fn derive_key(password: &Password, salt: &[u8], iterations: u32) -> KeyPair {
    let mut output = [0u8; 64];
    pbkdf2_hmac::<Sha512>(&password.kdf_bytes(), salt, iterations, &mut output);
    let pair = KeyPair::from_secret(&output);
    output.zeroize();
    pair
}

/// AES-256-CBC decryption without padding removal.
///
/// The ciphertext length must be a nonzero multiple of the block size. The
/// result is the raw XOR'd plaintext; callers trim it based on an
/// authenticated length field, so PKCS#7 padding bytes are never inspected.
pub(crate) fn decrypt_cbc(key: &[u8; 32], iv: &[u8; 16], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::format(
            "ciphertext length is not a nonzero multiple of the AES block size",
        ));
    }

    let mut buf = ciphertext.to_vec();
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|e| Error::Internal(format!("CBC decryption failed: {e}")))?;

    Ok(buf)
}

/// Verifies an HMAC-SHA-256 tag over the concatenation of `parts`.
///
/// The comparison runs in constant time. A mismatch is
/// [`Error::IntegrityFailure`].
pub(crate) fn verify_hmac(key: &[u8; 32], parts: &[&[u8]], tag: &[u8]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::Internal(format!("HMAC key rejected: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(tag).map_err(|_| Error::IntegrityFailure)
}
