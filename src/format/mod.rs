//! Low-level OPVault container formats.
//!
//! An OPVault directory stores everything as JavaScript-wrapped JSON whose
//! binary payloads are base64 strings in one of two authenticated container
//! layouts:
//!
//! - [`opdata`]: the framed `opdata01` container used for profile keys,
//!   entry overviews and entry details;
//! - [`itemkey`]: the unheadered `IV | ciphertext | HMAC` wrapper around
//!   each entry's 64-byte item key.
//!
//! [`js`] strips the JavaScript assignment wrapping from vault files and
//! [`uuid`] parses the 32-hex-character identifiers used as map keys
//! throughout the format.

pub mod itemkey;
pub mod js;
pub mod opdata;
pub mod uuid;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// Strict JSON schema coercions. The vault schemas reject unknown keys, and
// a recognized key with the wrong JSON type is just as much of a format
// violation.

pub(crate) fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::format(format!("{what} is not a string")))
}

pub(crate) fn expect_i64(value: &Value, what: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| Error::format(format!("{what} is not a number")))
}

pub(crate) fn expect_bool(value: &Value, what: &str) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::format(format!("{what} is not a boolean")))
}

pub(crate) fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::format(format!("{what} is not an object")))
}

pub(crate) fn expect_array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::format(format!("{what} is not an array")))
}

pub(crate) fn decode_base64(text: &str, what: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text)
        .map_err(|_| Error::format(format!("invalid base64 in {what}")))
}
