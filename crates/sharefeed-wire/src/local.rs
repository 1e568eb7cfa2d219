use serde::{Deserialize, Serialize};

use crate::lenient;

/// A share as persisted in the local key-value store.
///
/// Mirrors the canonical record. Required fields are strict; optional
/// fields tolerate `null` or a wrong type by reading back as absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalShareRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub selection: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient::millis")]
    pub shared_at: u64,
    pub shared_by: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub feed_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
