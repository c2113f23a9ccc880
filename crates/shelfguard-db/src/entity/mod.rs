//! database entity models for sea-orm.
//!
//! list-valued fields (privileges, overrides) are stored as json array
//! strings.

pub mod license;
pub mod license_type;
pub mod network_range;
pub mod user;

/// decode a json array column, treating null and garbage as empty.
pub(crate) fn decode_list<T: serde::de::DeserializeOwned + Default>(raw: Option<&str>) -> T {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// encode a list column, `None` if empty.
pub(crate) fn encode_list<T: serde::Serialize>(items: &T, is_empty: bool) -> Option<String> {
    if is_empty {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}
