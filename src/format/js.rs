//! JavaScript wrapper stripping.
//!
//! Vault files are not plain JSON: each one is a small JavaScript
//! assignment such as `var profile={...};`. The JSON document is recovered
//! by taking the substring from the first `{` to the last `}` inclusive;
//! everything outside those braces is discarded unparsed.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Extracts the JSON object embedded in a JavaScript vault file.
///
/// Fails with [`Error::InvalidFormat`] when either brace is missing or the
/// first `{` does not precede the last `}`.
pub fn extract_json(text: &str) -> Result<&str> {
    let start = text.find('{');
    let end = text.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(Error::format(
            "unable to extract JSON from JavaScript source",
        )),
    }
}

/// Reads a vault file and returns its embedded JSON text.
///
/// A missing file is [`Error::FileNotFound`]; content that is not UTF-8 or
/// has no JSON object is [`Error::InvalidFormat`].
pub(crate) fn load(path: &Path) -> Result<String> {
    match load_optional(path)? {
        Some(json) => Ok(json),
        None => Err(Error::FileNotFound {
            path: path.display().to_string(),
        }),
    }
}

/// Like [`load`], but an absent file yields `Ok(None)`.
///
/// Band files are optional; every other read error still propagates.
pub(crate) fn load_optional(path: &Path) -> Result<Option<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let text = String::from_utf8(bytes)
        .map_err(|_| Error::format(format!("{} is not valid UTF-8", path.display())))?;

    Ok(Some(extract_json(&text)?.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_wrapped_object() {
        let text = "var profile={\"uuid\":\"00\"};";
        assert_eq!(extract_json(text).unwrap(), "{\"uuid\":\"00\"}");
    }

    #[test]
    fn test_extracts_nested_braces() {
        let text = "loadFolders({\"a\":{\"b\":1}});";
        assert_eq!(extract_json(text).unwrap(), "{\"a\":{\"b\":1}}");
    }

    #[test]
    fn test_bare_object_is_identity() {
        let text = "{\"k\":2}";
        assert_eq!(extract_json(text).unwrap(), text);
    }

    #[test]
    fn test_missing_open_brace() {
        let err = extract_json("var x = 1};").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_close_brace() {
        let err = extract_json("var x = {1;").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_braces_out_of_order() {
        let err = extract_json("} nothing here {").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_empty_input() {
        let err = extract_json("").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_load_missing_file_is_file_not_found() {
        let err = load(Path::new("/nonexistent/profile.js")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_optional_missing_file_is_none() {
        let loaded = load_optional(Path::new("/nonexistent/band_0.js")).unwrap();
        assert!(loaded.is_none());
    }
}
