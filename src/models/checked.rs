use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const PHOTO_KEY_PREFIX: &str = "detail_";

/// A key of the checked-state map.
///
/// Serialized as the bare item index (`"3"`) or as `detail_<index>_<photo id>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckedKey {
    Item(usize),
    Photo { item: usize, photo_id: String },
}

impl CheckedKey {
    pub fn photo(item: usize, photo_id: impl Into<String>) -> Self {
        return Self::Photo {
            item,
            photo_id: photo_id.into(),
        };
    }

    pub fn item_index(&self) -> usize {
        return match self {
            Self::Item(index) => *index,
            Self::Photo { item, .. } => *item,
        };
    }
}

impl fmt::Display for CheckedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(index) => write!(f, "{index}"),
            Self::Photo { item, photo_id } => write!(f, "{PHOTO_KEY_PREFIX}{item}_{photo_id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid checked key: {0:?}")]
pub struct InvalidCheckedKey(String);

impl FromStr for CheckedKey {
    type Err = InvalidCheckedKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCheckedKey(s.to_string());

        let Some(rest) = s.strip_prefix(PHOTO_KEY_PREFIX) else {
            return s.parse().map(Self::Item).map_err(|_| invalid());
        };

        // photo ids may themselves contain underscores, so split on the first one only
        let (item, photo_id) = rest.split_once('_').ok_or_else(invalid)?;
        let item = item.parse().map_err(|_| invalid())?;

        if photo_id.is_empty() {
            return Err(invalid());
        }

        return Ok(Self::photo(item, photo_id));
    }
}

impl Serialize for CheckedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_str(self);
    }
}

impl<'de> Deserialize<'de> for CheckedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        return raw.parse().map_err(de::Error::custom);
    }
}

/// Sparse checked-state map. Absent keys read as unchecked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct CheckedItems(BTreeMap<CheckedKey, bool>);

impl CheckedItems {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn is_checked(&self, key: &CheckedKey) -> bool {
        return self.0.get(key).copied().unwrap_or(false);
    }

    pub fn set(&mut self, key: CheckedKey, checked: bool) {
        self.0.insert(key, checked);
    }

    pub fn remove(&mut self, key: &CheckedKey) {
        self.0.remove(key);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        return self.0.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.0.len();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CheckedKey, bool)> {
        return self.0.iter().map(|(key, checked)| (key, *checked));
    }
}

impl FromIterator<(CheckedKey, bool)> for CheckedItems {
    fn from_iter<I: IntoIterator<Item = (CheckedKey, bool)>>(iter: I) -> Self {
        return Self(iter.into_iter().collect());
    }
}
