use super::{
    aggregation::{self, AggregatedGroup, GroupProgress},
    ordering::{self, IndexedItem, SortOrder},
    progress,
};

use crate::models::{CheckedItems, CheckedKey, Game, ItemDetails, Photo, RotateDirection};

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChecklistError {
    #[error("No item at index {0}")]
    UnknownItem(usize),

    #[error("No photo {photo_id} on item {item}")]
    UnknownPhoto { item: usize, photo_id: String },

    #[error("No group named {0:?}")]
    UnknownGroup(String),
}

/// Checklist state of the selected game.
///
/// The item flag of an item with photos is a projection of its photo flags.
/// Every write that touches photos re-derives it, so the stored map always
/// agrees with [`Checklist::is_item_checked`].
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    game: Game,
}

impl Checklist {
    pub fn new(mut game: Game) -> Self {
        for photos in game.item_details.values_mut() {
            photos.retain(Photo::is_valid);
        }
        game.item_details.retain(|_, photos| !photos.is_empty());

        return Self { game };
    }

    pub fn game(&self) -> &Game {
        return &self.game;
    }

    pub fn into_game(self) -> Game {
        return self.game;
    }

    pub fn version(&self) -> i64 {
        return self.game.version;
    }

    pub fn items(&self) -> &[String] {
        return &self.game.items;
    }

    pub fn checked(&self) -> &CheckedItems {
        return &self.game.checked_items;
    }

    pub fn details(&self) -> &ItemDetails {
        return &self.game.item_details;
    }

    pub fn photos(&self, index: usize) -> &[Photo] {
        return self
            .game
            .item_details
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default();
    }

    pub fn rotation(&self, photo_id: &str) -> i32 {
        return self
            .game
            .photo_rotations
            .get(photo_id)
            .copied()
            .unwrap_or(0);
    }

    pub fn is_item_checked(&self, index: usize) -> bool {
        let photos = self.photos(index);

        if photos.is_empty() {
            return self.checked().is_checked(&CheckedKey::Item(index));
        }

        return photos
            .iter()
            .all(|photo| self.is_photo_checked(index, &photo.id));
    }

    pub fn is_photo_checked(&self, index: usize, photo_id: &str) -> bool {
        return self
            .checked()
            .is_checked(&CheckedKey::photo(index, photo_id));
    }

    pub fn groups(&self) -> BTreeMap<String, AggregatedGroup> {
        return aggregation::aggregate(self.items());
    }

    pub fn group_progress(&self) -> Vec<GroupProgress> {
        return aggregation::group_progress(self.items(), &self.groups(), |index| {
            self.is_item_checked(index)
        });
    }

    pub fn progress(&self) -> u8 {
        return progress::completion(self.items(), self.checked(), self.details());
    }

    pub fn sorted_items(&self, order: SortOrder) -> Vec<IndexedItem<'_>> {
        return ordering::sorted_items(self.items(), order);
    }

    /// Flips an item. With photos, the new value cascades to all of them.
    pub fn toggle_item(&mut self, index: usize) -> Result<bool, ChecklistError> {
        self.require_item(index)?;

        let checked = !self.is_item_checked(index);
        self.set_item(index, checked);

        return Ok(checked);
    }

    /// Flips one photo and re-derives its item's flag.
    pub fn toggle_photo(&mut self, index: usize, photo_id: &str) -> Result<bool, ChecklistError> {
        self.require_photo(index, photo_id)?;

        let checked = !self.is_photo_checked(index, photo_id);
        self.game
            .checked_items
            .set(CheckedKey::photo(index, photo_id), checked);
        self.derive_item(index);

        return Ok(checked);
    }

    /// Checks every member of a group unless all of it is already checked, in which case unchecks it all.
    pub fn toggle_group(&mut self, key: &str) -> Result<bool, ChecklistError> {
        let groups = self.groups();
        let group = groups
            .get(key)
            .ok_or_else(|| ChecklistError::UnknownGroup(key.to_string()))?;

        let checked_quantity =
            aggregation::checked_quantity(self.items(), group, |index| self.is_item_checked(index));
        let check = checked_quantity < group.total;

        for index in &group.members {
            self.set_item(*index, check);
        }

        return Ok(check);
    }

    pub fn reset(&mut self) {
        self.game.checked_items.clear();
    }

    pub fn add_photos(&mut self, index: usize, photos: Vec<Photo>) -> Result<(), ChecklistError> {
        self.require_item(index)?;

        let valid: Vec<Photo> = photos.into_iter().filter(Photo::is_valid).collect();
        if valid.is_empty() {
            return Ok(());
        }

        self.game
            .item_details
            .entry(index)
            .or_default()
            .extend(valid);
        self.derive_item(index);

        return Ok(());
    }

    pub fn remove_photo(&mut self, index: usize, photo_id: &str) -> Result<Photo, ChecklistError> {
        let position = self.require_photo(index, photo_id)?;

        let photos = self.game.item_details.entry(index).or_default();
        let removed = photos.remove(position);
        if photos.is_empty() {
            self.game.item_details.remove(&index);
        }

        self.game
            .checked_items
            .remove(&CheckedKey::photo(index, photo_id));
        self.game.photo_rotations.remove(photo_id);
        self.derive_item(index);

        return Ok(removed);
    }

    pub fn rename_photo(
        &mut self,
        index: usize,
        photo_id: &str,
        name: String,
    ) -> Result<(), ChecklistError> {
        let position = self.require_photo(index, photo_id)?;

        if let Some(photo) = self
            .game
            .item_details
            .get_mut(&index)
            .and_then(|photos| photos.get_mut(position))
        {
            photo.name = name;
        }

        return Ok(());
    }

    pub fn rotate_photo(
        &mut self,
        index: usize,
        photo_id: &str,
        direction: RotateDirection,
    ) -> Result<i32, ChecklistError> {
        self.require_photo(index, photo_id)?;

        let degrees = direction.apply(self.rotation(photo_id));
        self.game
            .photo_rotations
            .insert(photo_id.to_string(), degrees);

        return Ok(degrees);
    }

    fn set_item(&mut self, index: usize, checked: bool) {
        let photo_keys: Vec<CheckedKey> = self
            .photos(index)
            .iter()
            .map(|photo| CheckedKey::photo(index, photo.id.as_str()))
            .collect();

        let checked_items = &mut self.game.checked_items;
        checked_items.set(CheckedKey::Item(index), checked);
        for key in photo_keys {
            checked_items.set(key, checked);
        }
    }

    /// Re-derives the item flag from its photos and drops keys of photos that are gone.
    fn derive_item(&mut self, index: usize) {
        let photo_ids: Vec<&str> = self
            .photos(index)
            .iter()
            .map(|photo| photo.id.as_str())
            .collect();

        let stale: Vec<CheckedKey> = self
            .checked()
            .iter()
            .filter_map(|(key, _)| match key {
                CheckedKey::Photo { item, photo_id }
                    if *item == index && !photo_ids.contains(&photo_id.as_str()) =>
                {
                    Some(key.clone())
                }
                _ => None,
            })
            .collect();

        let has_photos = !photo_ids.is_empty();
        let derived = self.is_item_checked(index);

        let checked_items = &mut self.game.checked_items;
        for key in &stale {
            checked_items.remove(key);
        }
        if has_photos {
            checked_items.set(CheckedKey::Item(index), derived);
        }
    }

    fn require_item(&self, index: usize) -> Result<(), ChecklistError> {
        if index >= self.items().len() {
            return Err(ChecklistError::UnknownItem(index));
        }

        return Ok(());
    }

    fn require_photo(&self, index: usize, photo_id: &str) -> Result<usize, ChecklistError> {
        self.require_item(index)?;

        return self
            .photos(index)
            .iter()
            .position(|photo| photo.id == photo_id)
            .ok_or_else(|| ChecklistError::UnknownPhoto {
                item: index,
                photo_id: photo_id.to_string(),
            });
    }
}
