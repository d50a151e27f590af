//! # Blockchain Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::entities::Hash;

/// Where an appended block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockOrigin {
    /// Mined by this node's block producer.
    LocalProducer,
    /// Received from outside (peer, import, test harness).
    External,
}

/// Payload of [`BlockchainEvent::BlockAdded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAddedEvent {
    /// Hash of the appended block, now the chain tip.
    pub block_hash: Hash,
    /// Its height.
    pub height: u64,
    /// Its parent.
    pub prev_block_hash: Hash,
    /// Who produced it.
    pub origin: BlockOrigin,
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockchainEvent {
    /// A block was appended to the block store.
    BlockAdded(BlockAddedEvent),

    /// An externally supplied block failed validation and was not appended.
    BlockRejected {
        /// The rejected block's hash.
        block_hash: Hash,
        /// The violated rule.
        reason: String,
    },
}

impl BlockchainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockAdded(_) => EventTopic::Chain,
            Self::BlockRejected { .. } => EventTopic::Validation,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    /// Tip changes.
    Chain,
    /// Rejections of externally supplied blocks.
    Validation,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BlockchainEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
