//! Raindrop.io record types.

use crate::de::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection identifier. `0` addresses bookmarks outside any collection.
pub type FolderId = i64;

/// The implicit collection holding unsorted bookmarks.
pub const UNSORTED_FOLDER: FolderId = 0;

/// Bookmark identifier as assigned by the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl Default for ItemId {
    fn default() -> Self {
        ItemId::Int(0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{}", id),
            ItemId::Str(id) => f.write_str(id),
        }
    }
}

/// A bookmark ("raindrop").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id", default)]
    pub id: ItemId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub excerpt: String,

    /// Canonical URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// A collection of bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "_id")]
    pub id: FolderId,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

/// List responses wrap their records in `{"items": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ItemsEnvelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<T>,
}
