//! # opvault
//!
//! A pure-Rust, read-only importer for the 1Password OPVault ("Agile
//! Keychain Cloud") format.
//!
//! The crate decrypts and authenticates everything a vault directory holds:
//! the profile's wrapped master and overview keys, every folder overview,
//! and every entry's item key, overview and details. All payloads live in
//! authenticated containers (AES-256-CBC with HMAC-SHA-256 in
//! encrypt-then-MAC order), and the key ladder starts from a
//! PBKDF2-HMAC-SHA-512 derivation of the master password.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use opvault::{Password, Profile, Result, Vault};
//!
//! fn main() -> Result<()> {
//!     // Load the profile and unlock it with the master password.
//!     let mut profile = Profile::load("my.opvault/default/profile.js")?;
//!     profile.unlock(&Password::new("freddy"))?;
//!
//!     // Decrypt the whole catalog: folders plus every band entry.
//!     let vault = Vault::open("my.opvault", &profile)?;
//!     for entry in vault.entries() {
//!         println!("{} [{}]", entry.title(), entry.category().code());
//!     }
//!
//!     // Drop the key material when done.
//!     profile.lock();
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//!
//! - **Authenticate first.** Every ciphertext's HMAC is verified before a
//!   single AES block is decrypted, for the `opdata01` containers and the
//!   raw item-key blobs alike.
//! - **Length fields over padding.** `opdata01` records its true content
//!   length and front-pads; trailing padding bytes are never inspected.
//! - **Strict schemas.** Unknown JSON keys anywhere in the vault are format
//!   errors, so silent data loss cannot hide behind tolerant parsing.
//! - **Wrong password vs. forgery.** During unlock the two are
//!   indistinguishable by construction and both surface as
//!   [`Error::WrongPassword`].
//!
//! This crate only reads vaults. Writing, syncing and attachment decoding
//! are out of scope.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | Command-line tool for listing vault login items |

pub mod crypto;
pub mod error;
pub mod format;
pub mod vault;

mod profile;

pub use crypto::{KeyPair, Password, derive_key};
pub use error::{Error, Result};
pub use format::uuid::Uuid;
pub use profile::Profile;
pub use vault::{
    Category, Entry, Field, Folder, Form, FormMethod, LoginItem, PasswordHistoryItem, Section,
    Vault,
};
