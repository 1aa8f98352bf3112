//! Key-sorted JSON and the SHA-256 digests built on it.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, McgtError};

fn json_error(code: &str, err: serde_json::Error) -> McgtError {
    McgtError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Rebuilds every object of `value` with its keys in byte order.
fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            for (key, mut inner) in entries {
                sort_keys(&mut inner);
                map.insert(key, inner);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Compact JSON of `value` with object keys sorted at every depth.
///
/// Non-finite floats serialise as `null`, so two payloads differing only in
/// NaN placement hash alike.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, McgtError> {
    let mut tree = serde_json::to_value(value).map_err(|err| json_error("json-serialize", err))?;
    sort_keys(&mut tree);
    serde_json::to_vec(&tree).map_err(|err| json_error("json-write", err))
}

/// Parses JSON bytes into `T`.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, McgtError> {
    serde_json::from_slice(data).map_err(|err| json_error("json-deserialize", err))
}

/// Lower-case hex SHA-256 of the canonical JSON of `value`.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, McgtError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
}
