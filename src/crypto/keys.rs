//! Key material handling.

use sha2::{Digest, Sha512};
use zeroize::Zeroize;

/// A paired AES-256 key and HMAC-SHA-256 key.
///
/// Every secret in the OPVault key ladder is a 64-byte value split into a
/// 32-byte encryption half and a 32-byte authentication half: the PBKDF2
/// output, the unwrapped master and overview keys, and each entry's item
/// key all follow this shape. Both halves are zeroized when the pair is
/// dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct KeyPair {
    enc: [u8; 32],
    mac: [u8; 32],
}

impl KeyPair {
    /// Splits a 64-byte secret into its `(enc, mac)` halves.
    pub fn from_secret(secret: &[u8; 64]) -> Self {
        let mut enc = [0u8; 32];
        let mut mac = [0u8; 32];
        enc.copy_from_slice(&secret[..32]);
        mac.copy_from_slice(&secret[32..]);
        KeyPair { enc, mac }
    }

    /// Hashes unwrapped key material with SHA-512 and splits the digest.
    ///
    /// The profile's master and overview keys are stored as raw key data;
    /// the keys actually used for entry decryption are the split SHA-512
    /// digest of that data.
    pub fn from_sha512(material: &[u8]) -> Self {
        let mut digest: [u8; 64] = Sha512::digest(material).into();
        let pair = Self::from_secret(&digest);
        digest.zeroize();
        pair
    }

    /// The AES-256 half.
    pub fn enc(&self) -> &[u8; 32] {
        &self.enc
    }

    /// The HMAC-SHA-256 half.
    pub fn mac(&self) -> &[u8; 32] {
        &self.mac
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material in debug output.
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}
