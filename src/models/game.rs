use super::{CheckedItems, ItemDetails, PhotoRotations, ValidationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,

    pub name: String,
    pub search_name: String,

    #[sqlx(json)]
    pub items: Vec<String>,
    #[sqlx(json)]
    #[serde(default)]
    pub checked_items: CheckedItems,
    #[sqlx(json)]
    #[serde(default)]
    pub item_details: ItemDetails,
    #[sqlx(json)]
    #[serde(default)]
    pub photo_rotations: PhotoRotations,

    /// Bumped by every update. Orders the changes sessions receive.
    #[serde(default)]
    pub version: i64,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Game name and manifest as typed by the user, before validation.
#[derive(Deserialize, Debug, Clone)]
pub struct GameForm {
    pub name: String,
    pub items: Vec<String>,
}

/// A validated name and manifest, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDefinition {
    pub name: String,
    pub search_name: String,
    pub items: Vec<String>,
}

impl GameForm {
    pub fn validate(self) -> Result<GameDefinition, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyGameName);
        }

        let items: Vec<String> = self
            .items
            .into_iter()
            .filter(|item| !item.trim().is_empty())
            .collect();

        if items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        return Ok(GameDefinition {
            search_name: name.to_lowercase(),
            name,
            items,
        });
    }
}

/// Games whose name contains `query`, ignoring case. Queries under two characters match nothing.
pub fn search_games<'a>(games: &'a [Game], query: &str) -> Vec<&'a Game> {
    if query.chars().count() < 2 {
        return vec![];
    }

    let query = query.to_lowercase();

    return games
        .iter()
        .filter(|game| game.name.to_lowercase().contains(&query))
        .collect();
}
