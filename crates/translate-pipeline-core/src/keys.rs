//! Storage key derivation.
//!
//! Keys are slash-delimited strings. The pipeline derives its result key from
//! the input key's base file name; the interactive front-end derives all of
//! its keys from a submission timestamp.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::util::epoch_stamp;

/// Prefix under which results are written in the output location.
pub const RESULTS_PREFIX: &str = "translations/";
/// Prefix for files archived by the front-end.
pub const UPLOADS_PREFIX: &str = "uploads/";
/// Prefix for pasted text archived by the front-end.
pub const TEXT_INPUTS_PREFIX: &str = "text-inputs/";

/// Last path segment of a key.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// `translations/<basename(input_key)>`.
pub fn result_key_for(input_key: &str) -> Result<String> {
    let name = basename(input_key);
    if name.is_empty() {
        return Err(Error::InvalidKey {
            key: input_key.to_string(),
            reason: "key has no file name".to_string(),
        });
    }
    Ok(format!("{RESULTS_PREFIX}{name}"))
}

/// `uploads/<timestamp>.<ext>`.
pub fn upload_key(at: DateTime<Utc>, ext: &str) -> String {
    format!("{UPLOADS_PREFIX}{}.{ext}", epoch_stamp(at))
}

/// `text-inputs/<timestamp>.json`.
pub fn text_input_key(at: DateTime<Utc>) -> String {
    format!("{TEXT_INPUTS_PREFIX}{}.json", epoch_stamp(at))
}

/// `translations/<timestamp>.json`.
pub fn timestamped_result_key(at: DateTime<Utc>) -> String {
    format!("{RESULTS_PREFIX}{}.json", epoch_stamp(at))
}

/// Decode a key as delivered in a storage notification (form encoding:
/// `+` is a space, `%XX` escapes). Falls back to the raw key if it does not
/// decode to UTF-8.
pub fn decode_event_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}
