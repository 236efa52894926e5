use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Photo lists keyed by the index of the item they illustrate.
pub type ItemDetails = BTreeMap<usize, Vec<Photo>>;

/// Rotation in degrees keyed by photo id.
pub type PhotoRotations = BTreeMap<String, i32>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub name: String,

    /// `None` while an upload is pending. Such photos are never persisted.
    pub image: Option<String>,
    #[serde(rename = "cloudinaryPublicId", default)]
    pub public_id: Option<String>,
}

impl Photo {
    pub fn uploaded(position: usize, url: String, public_id: String) -> Self {
        return Self {
            id: Self::new_id(position),
            name: String::new(),
            image: Some(url),
            public_id: Some(public_id),
        };
    }

    /// Time-based id, disambiguated by the photo's position in its upload batch.
    pub fn new_id(position: usize) -> String {
        return format!("photo_{}_{position}", Utc::now().timestamp_millis());
    }

    pub fn is_valid(&self) -> bool {
        return self.image.is_some();
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn apply(self, degrees: i32) -> i32 {
        return match self {
            Self::Right => (degrees + 90).rem_euclid(360),
            Self::Left => (degrees - 90).rem_euclid(360),
        };
    }
}
