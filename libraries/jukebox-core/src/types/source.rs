//! Metadata backends
//!
//! Every track, album and artist is identified by the backend it came from plus
//! that backend's own identifier.

use crate::error::JukeboxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream metadata backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Spotify,
    Soundcloud,
    Youtube,
}

impl SourceType {
    /// All known backends
    pub const ALL: [SourceType; 3] = [Self::Spotify, Self::Soundcloud, Self::Youtube];

    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::Soundcloud => "soundcloud",
            Self::Youtube => "youtube",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = JukeboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spotify" => Ok(Self::Spotify),
            "soundcloud" => Ok(Self::Soundcloud),
            "youtube" => Ok(Self::Youtube),
            other => Err(JukeboxError::InvalidBackend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_string_conversion() {
        for source in SourceType::ALL {
            assert_eq!(source.as_str().parse::<SourceType>().unwrap(), source);
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = "deezer".parse::<SourceType>().unwrap_err();
        assert!(matches!(err, JukeboxError::InvalidBackend(name) if name == "deezer"));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&SourceType::Soundcloud).unwrap();
        assert_eq!(json, "\"soundcloud\"");
    }
}
