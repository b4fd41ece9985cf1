//! Vault folders.
//!
//! `folders.js` maps folder UUIDs to records whose only encrypted payload
//! is the overview, sealed under the profile's overview pair. Smart folders
//! additionally carry a serialized search predicate which this reader
//! tolerates but does not interpret.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::format::{self, opdata, uuid::Uuid};
use crate::profile::Profile;

/// A vault folder.
#[derive(Debug, Clone)]
pub struct Folder {
    uuid: Uuid,
    created_at: i64,
    updated_at: i64,
    tx: i64,
    title: String,
    smart: bool,
}

impl Folder {
    pub(crate) fn from_json(uuid: Uuid, json: &Value, profile: &Profile) -> Result<Folder> {
        let object = format::expect_object(json, "folder")?;
        let mut folder = Folder {
            uuid,
            created_at: 0,
            updated_at: 0,
            tx: 0,
            title: String::new(),
            smart: false,
        };

        for (key, value) in object {
            match key.as_str() {
                "created" => folder.created_at = format::expect_i64(value, "folder creation time")?,
                "updated" => {
                    folder.updated_at = format::expect_i64(value, "folder modification time")?;
                }
                "tx" => folder.tx = format::expect_i64(value, "folder transaction time")?,
                "uuid" => {
                    let inner = Uuid::parse(format::expect_str(value, "folder UUID")?)?;
                    if inner != uuid {
                        return Err(Error::format(
                            "folder internal and external UUIDs do not match",
                        ));
                    }
                }
                "overview" => {
                    let encoded = format::expect_str(value, "folder overview")?;
                    let blob = format::decode_base64(encoded, "folder overview")?;
                    let overview = opdata::decrypt(&blob, profile.overview_key()?)?;
                    let text = String::from_utf8(overview)
                        .map_err(|_| Error::format("folder overview is not valid UTF-8"))?;
                    folder.apply_overview(&text)?;
                }
                "smart" => folder.smart = format::expect_bool(value, "folder smart flag")?,
                other => return Err(Error::format(format!("unknown key {other:?} in folder"))),
            }
        }

        Ok(folder)
    }

    fn apply_overview(&mut self, overview: &str) -> Result<()> {
        let json: Value = serde_json::from_str(overview)
            .map_err(|_| Error::format("unable to parse JSON data in folder overview"))?;
        let object = format::expect_object(&json, "folder overview")?;

        for (key, value) in object {
            match key.as_str() {
                "title" => self.title = format::expect_str(value, "folder title")?.to_string(),
                "predicate_b64" => {
                    decode_predicate(format::expect_str(value, "folder predicate")?)?;
                }
                other => {
                    return Err(Error::format(format!(
                        "unknown key {other:?} in folder overview"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Creation time, seconds since the epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Modification time, seconds since the epoch.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Last sync transaction time, seconds since the epoch.
    pub fn tx(&self) -> i64 {
        self.tx
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Smart folders hold a search predicate instead of filed entries.
    pub fn smart(&self) -> bool {
        self.smart
    }
}

/// Validates a smart folder's serialized predicate and discards it.
///
/// The writer appends a stray character after the base64 padding; trimming
/// back to the last `=` makes the payload decodable. The decoded bytes are
/// Apple `bplist00` data and are intentionally not parsed.
fn decode_predicate(encoded: &str) -> Result<()> {
    let mut predicate = encoded;
    if predicate.len() % 4 != 0 {
        if let Some(pos) = predicate.rfind('=') {
            predicate = &predicate[..=pos];
        }
    }

    format::decode_base64(predicate, "folder predicate")?;
    Ok(())
}
