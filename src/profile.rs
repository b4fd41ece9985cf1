//! Vault profile loading and the password key ladder.
//!
//! A profile is the unlock root of a vault: `profile.js` holds the PBKDF2
//! salt and iteration count plus the master and overview keys, each sealed
//! in an [`opdata01`](crate::format::opdata) container under the key pair
//! derived from the password. Unlocking runs the ladder
//!
//! ```text
//! password --PBKDF2-SHA512--> derived pair
//! derived pair + lockedMasterKey   --opdata01--> SHA-512 --> master pair
//! derived pair + lockedOverviewKey --opdata01--> SHA-512 --> overview pair
//! ```
//!
//! and an authentication failure anywhere in the ladder is reported as
//! [`Error::WrongPassword`]: a forged profile and a mistyped password are
//! deliberately indistinguishable.

use std::path::Path;

use serde_json::Value;
use zeroize::Zeroizing;

use crate::crypto::{self, KeyPair, Password};
use crate::error::{Error, Result};
use crate::format::{self, js, opdata, uuid::Uuid};

/// Unlock state: either no key material at all, or both unwrapped pairs.
///
/// Dropping the unlocked state zeroizes all four key halves.
enum KeyState {
    Locked,
    Unlocked { master: KeyPair, overview: KeyPair },
}

/// A vault profile: metadata, wrapped keys, and unlock state.
///
/// # Lifecycle
///
/// [`Profile::load`] parses `profile.js` into a locked profile.
/// [`Profile::unlock`] derives the password keys and unwraps the master and
/// overview pairs; [`Profile::lock`] discards them again. Catalog loading
/// borrows the unlocked keys read-only.
///
/// ```rust,no_run
/// use opvault::{Password, Profile};
///
/// # fn main() -> opvault::Result<()> {
/// let mut profile = Profile::load("vault/default/profile.js")?;
/// profile.unlock(&Password::new("freddy"))?;
/// assert!(!profile.is_locked());
/// profile.lock();
/// # Ok(())
/// # }
/// ```
pub struct Profile {
    uuid: Uuid,
    created_at: i64,
    updated_at: i64,
    name: String,
    last_updater: String,
    iterations: u32,
    salt: Vec<u8>,
    locked_master_key: Vec<u8>,
    locked_overview_key: Vec<u8>,
    keys: KeyState,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material (salt, locked keys, unlocked keys) in debug output.
        f.debug_struct("Profile")
            .field("uuid", &self.uuid)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("name", &self.name)
            .field("last_updater", &self.last_updater)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

impl Profile {
    /// Loads and parses `profile.js`.
    ///
    /// The schema is strict: the nine documented keys are accepted and
    /// anything else is [`Error::InvalidFormat`]. A missing file is
    /// [`Error::FileNotFound`]. The returned profile is locked.
    pub fn load(path: impl AsRef<Path>) -> Result<Profile> {
        let path = path.as_ref();
        let text = js::load(path)?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|_| Error::format("unable to parse JSON data in profile"))?;
        let object = format::expect_object(&json, "profile")?;

        let mut profile = Profile {
            uuid: Uuid::nil(),
            created_at: 0,
            updated_at: 0,
            name: String::new(),
            last_updater: String::new(),
            iterations: 0,
            salt: Vec::new(),
            locked_master_key: Vec::new(),
            locked_overview_key: Vec::new(),
            keys: KeyState::Locked,
        };

        for (key, value) in object {
            match key.as_str() {
                "createdAt" => {
                    profile.created_at = format::expect_i64(value, "profile creation time")?;
                }
                "updatedAt" => {
                    profile.updated_at = format::expect_i64(value, "profile modification time")?;
                }
                "iterations" => {
                    let count = format::expect_i64(value, "profile iteration count")?;
                    profile.iterations = u32::try_from(count).map_err(|_| {
                        Error::format("profile iteration count does not fit in 32 bits")
                    })?;
                }
                "lastUpdatedBy" => {
                    profile.last_updater =
                        format::expect_str(value, "profile updater")?.to_string();
                }
                "profileName" => {
                    profile.name = format::expect_str(value, "profile name")?.to_string();
                }
                "salt" => {
                    let encoded = format::expect_str(value, "profile salt")?;
                    profile.salt = format::decode_base64(encoded, "profile salt")?;
                }
                "masterKey" => {
                    let encoded = format::expect_str(value, "profile master key")?;
                    profile.locked_master_key =
                        format::decode_base64(encoded, "profile master key")?;
                }
                "overviewKey" => {
                    let encoded = format::expect_str(value, "profile overview key")?;
                    profile.locked_overview_key =
                        format::decode_base64(encoded, "profile overview key")?;
                }
                "uuid" => {
                    profile.uuid = Uuid::parse(format::expect_str(value, "profile UUID")?)?;
                }
                other => {
                    return Err(Error::format(format!("unknown key {other:?} in profile")));
                }
            }
        }

        log::debug!("loaded profile {:?} from {}", profile.name, path.display());
        Ok(profile)
    }

    /// Unlocks the profile with the master password.
    ///
    /// Derives the password key pair and unwraps the master and overview
    /// pairs. An authentication failure on either wrapped key is reported
    /// as [`Error::WrongPassword`]; the profile stays locked, and a later
    /// attempt with the correct password still succeeds.
    pub fn unlock(&mut self, password: &Password) -> Result<()> {
        if self.salt.is_empty()
            || self.iterations == 0
            || self.locked_master_key.is_empty()
            || self.locked_overview_key.is_empty()
        {
            return Err(Error::format("profile is missing key derivation data"));
        }

        let derived = crypto::derive_key(password, &self.salt, self.iterations);
        let master = unwrap_key(&self.locked_master_key, &derived)?;
        let overview = unwrap_key(&self.locked_overview_key, &derived)?;

        self.keys = KeyState::Unlocked { master, overview };
        log::debug!("unlocked profile {:?}", self.name);
        Ok(())
    }

    /// Discards the unlocked key material, zeroizing all four key halves.
    pub fn lock(&mut self) {
        self.keys = KeyState::Locked;
    }

    /// Returns true when no unlocked key material is held.
    pub fn is_locked(&self) -> bool {
        matches!(self.keys, KeyState::Locked)
    }

    pub(crate) fn master_key(&self) -> Result<&KeyPair> {
        match &self.keys {
            KeyState::Unlocked { master, .. } => Ok(master),
            KeyState::Locked => Err(Error::Internal("profile is locked".into())),
        }
    }

    pub(crate) fn overview_key(&self) -> Result<&KeyPair> {
        match &self.keys {
            KeyState::Unlocked { overview, .. } => Ok(overview),
            KeyState::Locked => Err(Error::Internal("profile is locked".into())),
        }
    }

    /// The profile UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The profile display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client that last wrote the profile.
    pub fn last_updater(&self) -> &str {
        &self.last_updater
    }

    /// The PBKDF2 iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Creation time, seconds since the epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Modification time, seconds since the epoch.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

fn unwrap_key(locked: &[u8], derived: &KeyPair) -> Result<KeyPair> {
    match opdata::decrypt(locked, derived) {
        Ok(material) => {
            let material = Zeroizing::new(material);
            Ok(KeyPair::from_sha512(&material))
        }
        // A MAC failure here is indistinguishable from a wrong password.
        Err(Error::IntegrityFailure) => Err(Error::WrongPassword),
        Err(e) => Err(e),
    }
}
