use super::matching::strip_quantity;

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Default,
    Asc,
    Desc,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexedItem<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Items in display order. Sorting ignores the leading quantity and case; each entry keeps its manifest index.
pub fn sorted_items(items: &[String], order: SortOrder) -> Vec<IndexedItem<'_>> {
    let mut sorted: Vec<IndexedItem> = items
        .iter()
        .enumerate()
        .map(|(index, text)| IndexedItem { index, text })
        .collect();

    let sort_key = |item: &IndexedItem| strip_quantity(item.text).to_lowercase();

    match order {
        SortOrder::Default => {}
        SortOrder::Asc => sorted.sort_by_cached_key(sort_key),
        SortOrder::Desc => sorted.sort_by_cached_key(|item| Reverse(sort_key(item))),
    }

    return sorted;
}
