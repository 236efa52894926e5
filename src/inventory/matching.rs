/// An item line of the form `<quantity> <description>`, e.g. "8 cartes Glace".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantifiedItem<'a> {
    pub quantity: u64,
    pub description: &'a str,
    pub group_key: String,
}

/// Parses a manifest line into its quantity and inferred type keyword.
///
/// The keyword is the first token of the description, lower-cased, with a
/// single trailing "s" removed. This is a best-effort heuristic: irregular
/// plurals are not handled and "boxes" lands under "boxe".
///
/// Aggregation and the group toggle both go through this function, so what is
/// shown as a group is exactly what gets toggled as one.
pub fn parse_item(text: &str) -> Option<QuantifiedItem<'_>> {
    let digits_end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    if digits_end == 0 {
        return None;
    }

    let (digits, rest) = text.split_at(digits_end);

    // at least one separator between quantity and description
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let quantity: u64 = digits.parse().ok()?;

    let description = rest.trim();
    if description.is_empty() {
        return None;
    }

    let group_key = group_key(description)?;

    return Some(QuantifiedItem {
        quantity,
        description,
        group_key,
    });
}

/// Normalizes the first token of a description into a group key.
pub fn group_key(description: &str) -> Option<String> {
    let token = description.split_whitespace().next()?.to_lowercase();

    let key = match token.strip_suffix('s') {
        Some(singular) => singular.to_string(),
        None => token,
    };

    if key.is_empty() {
        return None;
    }

    return Some(key);
}

/// The item text with its leading quantity removed, used for alphabetical ordering.
pub fn strip_quantity(text: &str) -> &str {
    return text
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantity_and_first_token() {
        let parsed = parse_item("8 cartes Glace").unwrap();
        assert_eq!(parsed.quantity, 8);
        assert_eq!(parsed.description, "cartes Glace");
        assert_eq!(parsed.group_key, "carte");
    }

    #[test]
    fn key_is_case_insensitive() {
        assert_eq!(parse_item("3 CARTES").unwrap().group_key, "carte");
        assert_eq!(parse_item("2 Dés rouges").unwrap().group_key, "dé");
    }

    #[test]
    fn strips_only_one_trailing_s() {
        assert_eq!(parse_item("4 boxes").unwrap().group_key, "boxe");
        assert_eq!(parse_item("2 bass").unwrap().group_key, "bas");
    }

    #[test]
    fn rejects_lines_without_leading_quantity() {
        assert_eq!(parse_item("plateau"), None);
        assert_eq!(parse_item(" 8 cartes"), None);
        assert_eq!(parse_item("8cartes"), None);
        assert_eq!(parse_item("8   "), None);
        assert_eq!(parse_item("12"), None);
    }

    #[test]
    fn digits_are_matched_greedily() {
        let parsed = parse_item("120 jetons").unwrap();
        assert_eq!(parsed.quantity, 120);
        assert_eq!(parsed.group_key, "jeton");
    }

    #[test]
    fn lone_s_token_has_no_key() {
        assert_eq!(parse_item("3 s"), None);
    }

    #[test]
    fn oversized_quantity_is_not_aggregated() {
        assert_eq!(parse_item("99999999999999999999999 cartes"), None);
    }

    #[test]
    fn strip_quantity_drops_leading_digits() {
        assert_eq!(strip_quantity("11 cartes Chapeau"), "cartes Chapeau");
        assert_eq!(strip_quantity("plateau"), "plateau");
    }
}
