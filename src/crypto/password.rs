//! Password handling for vault decryption.

use zeroize::Zeroizing;

/// A master password for unlocking a vault profile.
///
/// This type stores the password securely and provides the byte view
/// required by the OPVault key derivation function.
#[derive(Clone)]
pub struct Password {
    inner: Zeroizing<String>,
}

impl Password {
    /// Creates a new password from a string.
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self {
            inner: Zeroizing::new(password.into()),
        }
    }

    /// Returns the bytes fed to PBKDF2.
    ///
    /// The trailing NUL terminator is included: the reference format derives
    /// keys over the C string including its terminator, so compatible key
    /// derivation must do the same.
    pub fn kdf_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.inner.len() + 1);
        bytes.extend_from_slice(self.inner.as_bytes());
        bytes.push(0);
        Zeroizing::new(bytes)
    }

    /// Returns the password as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the length of the password in characters.
    pub fn len(&self) -> usize {
        self.inner.chars().count()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the actual password in debug output
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
