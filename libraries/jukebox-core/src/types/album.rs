//! Album types

use super::SourceType;
use serde::{Deserialize, Serialize};

pub type AlbumId = i64;

/// An album, unique by `(source_type, source_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub source_type: SourceType,
    pub source_id: String,
    pub name: String,
    pub uri: Option<String>,
    pub image_small: Option<String>,
    pub image_medium: Option<String>,
    pub image_large: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Album as reported by a metadata source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumData {
    pub source_type: SourceType,
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub image_small: Option<String>,
    #[serde(default)]
    pub image_medium: Option<String>,
    #[serde(default)]
    pub image_large: Option<String>,
}

impl AlbumData {
    pub fn new(
        source_type: SourceType,
        source_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            source_id: source_id.into(),
            name: name.into(),
            uri: None,
            image_small: None,
            image_medium: None,
            image_large: None,
        }
    }
}
