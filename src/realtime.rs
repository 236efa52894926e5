use crate::models::Game;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::BroadcastStream;

const CHANNEL_CAPACITY: usize = 256;

/// A row change in the `games` collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum GameChange {
    Insert { game: Game },
    Update { game: Game },
    Delete { id: i64 },
}

impl GameChange {
    pub fn game_id(&self) -> i64 {
        return match self {
            Self::Insert { game } | Self::Update { game } => game.id,
            Self::Delete { id } => *id,
        };
    }
}

/// Fan-out of game changes to every open session. The store is the only publisher.
#[derive(Clone)]
pub struct RealtimeHub {
    sender: broadcast::Sender<GameChange>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        return Self::new(CHANNEL_CAPACITY);
    }
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);

        return Self { sender };
    }

    pub fn publish(&self, change: GameChange) {
        // no subscribers is fine, nobody has a game open
        let receivers = self.sender.send(change).unwrap_or(0);

        tracing::debug!(receivers, "game change published");
    }

    pub fn subscribe(&self) -> ChangeStream {
        return ChangeStream {
            receiver: self.sender.subscribe(),
        };
    }

    pub fn stream(&self) -> BroadcastStream<GameChange> {
        return BroadcastStream::new(self.sender.subscribe());
    }
}

pub struct ChangeStream {
    receiver: broadcast::Receiver<GameChange>,
}

impl ChangeStream {
    /// Next change, or `None` once the hub is gone. Changes missed by a slow consumer are skipped.
    pub async fn next(&mut self) -> Option<GameChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "realtime consumer lagged, skipping changes");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
