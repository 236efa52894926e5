/// Input rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Game name is required")]
    EmptyGameName,

    #[error("A game needs at least one item")]
    NoItems,

    #[error("Rating must be between 1 and 5 stars, got {0}")]
    InvalidRating(i16),

    #[error("Sender name is required")]
    MissingSenderName,
}
