//! Artist types

use super::SourceType;
use serde::{Deserialize, Serialize};

pub type ArtistId = i64;

/// An artist, unique by `(source_type, source_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub source_type: SourceType,
    pub source_id: String,
    pub name: String,
    pub uri: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Artist as reported by a metadata source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistData {
    pub source_type: SourceType,
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
}

impl ArtistData {
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
        }
    }
}
