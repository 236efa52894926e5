use crate::models::{CheckedItems, CheckedKey, ItemDetails};

/// Overall completion of a game's inventory, 0 to 100.
///
/// Every item weighs the same. An item with photos earns its share in
/// proportion to the photos checked; any other item earns it all or nothing.
pub fn completion(items: &[String], checked: &CheckedItems, details: &ItemDetails) -> u8 {
    if items.is_empty() {
        return 0;
    }

    let share = 100.0 / items.len() as f64;

    let earned: f64 = (0..items.len())
        .map(|index| {
            let photos: Vec<_> = details
                .get(&index)
                .map(|photos| photos.iter().filter(|p| p.is_valid()).collect())
                .unwrap_or_default();

            if photos.is_empty() {
                return if checked.is_checked(&CheckedKey::Item(index)) {
                    share
                } else {
                    0.0
                };
            }

            let checked_photos = photos
                .iter()
                .filter(|photo| checked.is_checked(&CheckedKey::photo(index, photo.id.as_str())))
                .count();

            checked_photos as f64 / photos.len() as f64 * share
        })
        .sum();

    return earned.round().clamp(0.0, 100.0) as u8;
}
