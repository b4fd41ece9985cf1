//! Error types for OPVault operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when reading an OPVault directory, along with a convenient
//! [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. You can
//! handle errors using pattern matching or the `?` operator:
//!
//! ```rust,no_run
//! use opvault::{Password, Profile, Result, Vault};
//!
//! fn open_vault(root: &str, password: &str) -> Result<Vault> {
//!     let mut profile = Profile::load(format!("{root}/default/profile.js"))?;
//!     profile.unlock(&Password::new(password))?;
//!     Vault::open(root, &profile)
//! }
//! ```
//!
//! For fine-grained handling, match on specific variants:
//!
//! ```rust,no_run
//! use opvault::{Error, Password, Profile};
//!
//! fn unlock_with_retry(profile: &mut Profile, password: &str) {
//!     match profile.unlock(&Password::new(password)) {
//!         Ok(()) => {}
//!         Err(Error::WrongPassword) => eprintln!("Incorrect password."),
//!         Err(Error::InvalidFormat(msg)) => eprintln!("Damaged vault: {msg}"),
//!         Err(e) => eprintln!("error: {e}"),
//!     }
//! }
//! ```

use std::io;

/// The main error type for OPVault operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`FileNotFound`][Self::FileNotFound] | File system operations |
/// | Format | [`InvalidFormat`][Self::InvalidFormat] | Malformed vault data |
/// | Authenticity | [`IntegrityFailure`][Self::IntegrityFailure], [`WrongPassword`][Self::WrongPassword] | HMAC verification |
/// | Bugs | [`Internal`][Self::Internal] | Violated preconditions |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading a vault file.
    ///
    /// This wraps [`std::io::Error`] for failures other than a missing
    /// required file, e.g. permission problems or reads failing midway.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required vault file is absent.
    ///
    /// `profile.js` and `folders.js` must exist; band files are optional
    /// and skipping them is not an error.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The path that could not be opened.
        path: String,
    },

    /// The vault data is structurally invalid.
    ///
    /// Covers every format violation: bad base64, truncated or malformed
    /// `opdata01` and key blobs, wrong magic, JSON parse failures, unknown
    /// schema keys, UUID mismatches, and failed JavaScript brace stripping.
    #[error("invalid vault format: {0}")]
    InvalidFormat(String),

    /// An HMAC authentication check failed on an encrypted payload.
    ///
    /// The ciphertext was rejected before any decryption took place. During
    /// [`Profile::unlock`](crate::Profile::unlock) this is indistinguishable
    /// from a wrong password and is reported as
    /// [`WrongPassword`][Self::WrongPassword] instead.
    #[error("HMAC integrity and authenticity check failed")]
    IntegrityFailure,

    /// The master password did not unlock the profile.
    #[error("wrong password")]
    WrongPassword,

    /// A precondition inside a cryptographic primitive was violated.
    ///
    /// Indicates a bug in this crate, not a problem with the vault or the
    /// caller's input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns `true` if this error relates to password-based decryption.
    pub fn is_encryption_error(&self) -> bool {
        matches!(self, Error::WrongPassword | Error::IntegrityFailure)
    }

    /// Returns `true` if this error indicates damaged or forged vault data.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::InvalidFormat(_) | Error::IntegrityFailure)
    }

    /// Returns `true` if the operation might succeed when retried with
    /// different input (e.g. another password).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::WrongPassword => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }
}

/// A specialized Result type for OPVault operations.
///
/// This is defined as `std::result::Result<T, Error>` for convenience.
pub type Result<T> = std::result::Result<T, Error>;
