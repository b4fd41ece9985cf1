//! Vault entry identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A 16-byte identifier parsed from 32 hexadecimal characters.
///
/// OPVault keys profiles, folders and entries by undashed hex UUIDs such as
/// `358B5CA9A90D4699B71D8DF7A311E073`. Parsing is case-insensitive; any
/// other length or a non-hex character is rejected.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uuid([u8; 16]);

impl Uuid {
    /// Parses an identifier from its 32-character hex form.
    pub fn parse(hex_str: &str) -> Result<Self> {
        if hex_str.len() != 32 {
            return Err(Error::format("UUID must be 32 hexadecimal characters"));
        }

        let decoded =
            hex::decode(hex_str).map_err(|_| Error::format("unexpected character in UUID"))?;

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&decoded);
        Ok(Uuid(bytes))
    }

    /// The all-zero identifier.
    pub const fn nil() -> Self {
        Uuid([0u8; 16])
    }

    /// Returns true for the all-zero identifier.
    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 16]
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl FromStr for Uuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse(s)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({self})")
    }
}
