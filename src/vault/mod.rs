//! The decrypted vault catalog.
//!
//! A vault directory keeps everything under `default/`: the profile, a
//! required `folders.js`, and up to sixteen band files (`band_0.js` through
//! `band_9.js`, then `band_A.js` through `band_F.js`) holding entries
//! sharded by UUID prefix. [`Vault::open`] walks them in that fixed order
//! and either returns a fully decrypted catalog or fails on the first
//! error; there are no partial results.

mod entry;
mod folder;

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::format::{self, js, uuid::Uuid};
use crate::profile::Profile;

pub use entry::{Category, Entry, Field, Form, FormMethod, PasswordHistoryItem, Section};
pub use folder::Folder;

/// A decrypted, authenticated catalog of folders and entries.
///
/// # Example
///
/// ```rust,no_run
/// use opvault::{Password, Profile, Vault};
///
/// # fn main() -> opvault::Result<()> {
/// let mut profile = Profile::load("vault/default/profile.js")?;
/// profile.unlock(&Password::new("freddy"))?;
///
/// let vault = Vault::open("vault", &profile)?;
/// for item in vault.login_items() {
///     println!("{}: {}", item.url(), item.password());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Vault {
    folders: Vec<Folder>,
    entries: Vec<Entry>,
}

/// The `(url, password)` projection of a login entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginItem {
    url: String,
    password: String,
}

impl LoginItem {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The stored password; empty when the entry has no designated
    /// password field.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Vault {
    /// Loads and decrypts the catalog rooted at `root`.
    ///
    /// `root` is the vault directory containing `default/`. The profile
    /// must be unlocked. `folders.js` is required; absent band files are
    /// silently skipped.
    pub fn open(root: impl AsRef<Path>, profile: &Profile) -> Result<Vault> {
        if profile.is_locked() {
            return Err(Error::Internal("profile is locked".into()));
        }

        let base = root.as_ref().join("default");
        let mut vault = Vault {
            folders: Vec::new(),
            entries: Vec::new(),
        };

        vault.load_folders(&base.join("folders.js"), profile)?;
        for file_name in band_file_names() {
            vault.load_band(&base.join(&file_name), profile)?;
        }

        log::debug!(
            "loaded {} folders and {} entries from {}",
            vault.folders.len(),
            vault.entries.len(),
            root.as_ref().display()
        );
        Ok(vault)
    }

    fn load_folders(&mut self, path: &Path, profile: &Profile) -> Result<()> {
        let text = js::load(path)?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|_| Error::format("unable to parse JSON data in folders"))?;
        let object = format::expect_object(&json, "folders")?;

        for (key, value) in object {
            let uuid = Uuid::parse(key)?;
            self.folders.push(Folder::from_json(uuid, value, profile)?);
        }

        Ok(())
    }

    fn load_band(&mut self, path: &Path, profile: &Profile) -> Result<()> {
        let Some(text) = js::load_optional(path)? else {
            return Ok(());
        };

        let json: Value = serde_json::from_str(&text)
            .map_err(|_| Error::format("unable to parse JSON data in band file"))?;
        let object = format::expect_object(&json, "band file")?;

        for (key, value) in object {
            let uuid = Uuid::parse(key)?;
            self.entries.push(Entry::from_json(uuid, value, profile)?);
        }

        log::debug!("loaded band file {}", path.display());
        Ok(())
    }

    /// Folders in file traversal order.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Entries in file traversal order, trashed entries included.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Projects every [`Category::Login`] entry to its URL and password.
    pub fn login_items(&self) -> Vec<LoginItem> {
        self.entries
            .iter()
            .filter(|entry| entry.category() == Category::Login)
            .map(|entry| LoginItem {
                url: entry.url().to_string(),
                password: entry.password().unwrap_or_default().to_string(),
            })
            .collect()
    }
}

/// Band file names in their fixed traversal order.
fn band_file_names() -> impl Iterator<Item = String> {
    ('0'..='9')
        .chain('A'..='F')
        .map(|shard| format!("band_{shard}.js"))
}
