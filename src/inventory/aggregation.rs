use super::matching::parse_item;

use std::collections::BTreeMap;

use serde::Serialize;

/// Items sharing an inferred type keyword, e.g. every "N cartes ..." line.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AggregatedGroup {
    pub key: String,
    pub total: u64,
    pub members: Vec<usize>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupProgress {
    pub key: String,
    pub total: u64,
    pub checked: u64,
    pub complete: bool,
}

/// Buckets quantity-prefixed items by type keyword.
///
/// Lines without a leading quantity never join a group, and groups with a
/// single member are dropped since there is nothing to check off in bulk.
pub fn aggregate(items: &[String]) -> BTreeMap<String, AggregatedGroup> {
    let mut groups: BTreeMap<String, AggregatedGroup> = BTreeMap::new();

    for (index, item) in items.iter().enumerate() {
        let Some(parsed) = parse_item(item) else {
            continue;
        };

        let group = groups
            .entry(parsed.group_key.clone())
            .or_insert_with(|| AggregatedGroup {
                key: parsed.group_key,
                total: 0,
                members: vec![],
            });

        group.total = group.total.saturating_add(parsed.quantity);
        group.members.push(index);
    }

    groups.retain(|_, group| group.members.len() > 1);

    return groups;
}

/// Sum of quantities of the group's members whose item flag reads as checked.
pub fn checked_quantity(
    items: &[String],
    group: &AggregatedGroup,
    is_checked: impl Fn(usize) -> bool,
) -> u64 {
    return group
        .members
        .iter()
        .filter(|index| is_checked(**index))
        .filter_map(|index| items.get(*index).and_then(|item| parse_item(item)))
        .filter(|parsed| parsed.group_key == group.key)
        .map(|parsed| parsed.quantity)
        .fold(0, u64::saturating_add);
}

pub fn group_progress(
    items: &[String],
    groups: &BTreeMap<String, AggregatedGroup>,
    is_checked: impl Fn(usize) -> bool,
) -> Vec<GroupProgress> {
    return groups
        .values()
        .map(|group| {
            let checked = checked_quantity(items, group, &is_checked);

            GroupProgress {
                key: group.key.clone(),
                total: group.total,
                checked,
                complete: checked == group.total,
            }
        })
        .collect();
}
