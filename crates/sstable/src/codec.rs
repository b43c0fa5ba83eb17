//! Block line codec: `<key>,<base64(json)>`.
//!
//! The key is repeated in clear text before the comma so that an in-block
//! search can compare keys without base64-decoding every candidate line.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use memtable::Entry;

use crate::error::TableError;

pub(crate) fn encode_line(entry: &Entry) -> Result<String, TableError> {
    let json = serde_json::to_vec(entry)?;
    Ok(format!("{},{}", entry.key, STANDARD.encode(json)))
}

/// Splits on the first `,` and decodes the payload after it.
pub(crate) fn decode_line(line: &str) -> Result<Entry, TableError> {
    let (_, payload) = line.split_once(',').ok_or(TableError::MalformedLine)?;
    let json = STANDARD.decode(payload)?;
    Ok(serde_json::from_slice(&json)?)
}

/// The clear-text key prefix of a line. In-block comparisons must use this,
/// never the whole line: the base64 payload would otherwise leak into the
/// ordering and make present keys unfindable.
pub(crate) fn line_key(line: &str) -> &str {
    line.split_once(',').map(|(key, _)| key).unwrap_or(line)
}
