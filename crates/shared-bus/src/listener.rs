//! # Block-Added Listeners
//!
//! Components that react to tip changes implement [`BlockAddedListener`] and
//! are attached to the bus with [`spawn_listener`]. Each listener gets its
//! own subscription queue and its own task, so a slow listener only delays
//! itself.

use crate::events::{BlockAddedEvent, BlockchainEvent, EventFilter, EventTopic};
use crate::publisher::InMemoryEventBus;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capability implemented by anything that reacts to a new chain tip.
pub trait BlockAddedListener: Send + Sync {
    /// Called once per appended block, in publication order.
    fn on_block_added(&self, event: &BlockAddedEvent);
}

/// Subscribe `listener` to block-added events and drive it on a new task.
///
/// The task ends when the bus is dropped.
pub fn spawn_listener(
    bus: &InMemoryEventBus,
    listener: Arc<dyn BlockAddedListener>,
) -> JoinHandle<()> {
    let mut subscription = bus.subscribe(EventFilter::topics(vec![EventTopic::Chain]));

    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            if let BlockchainEvent::BlockAdded(added) = event {
                listener.on_block_added(&added);
            }
        }
        debug!("Block-added listener stopped (bus closed)");
    })
}
