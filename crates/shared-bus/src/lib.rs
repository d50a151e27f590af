//! # Shared Bus - Block-Added Event Fanout
//!
//! The block producer publishes a [`BlockchainEvent::BlockAdded`] after every
//! successful append. Anything that cares about the chain tip (the producer
//! itself, network relays, indexers) subscribes.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐   recv()   ┌──────────────┐
//! │ Block        │ ────────────► │  Event Bus   │ ─────────► │ Listener A   │
//! │ Producer     │               │ (broadcast)  │ ─────────► │ Listener B   │
//! └──────────────┘               └──────────────┘            └──────────────┘
//! ```
//!
//! Publishing never waits on listeners: every subscription has its own
//! bounded queue and lagging subscribers drop their oldest events.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod listener;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BlockAddedEvent, BlockOrigin, BlockchainEvent, EventFilter, EventTopic};
pub use listener::{spawn_listener, BlockAddedListener};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
