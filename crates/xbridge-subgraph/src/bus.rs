//! Broadcast bus for indexer events.
//!
//! The poller publishes status-change events here; the SDK event surface
//! subscribes. Subscribers created after an event was published never see
//! it — there is no replay.

use tokio::sync::broadcast;
use xbridge_types::SubgraphEvent;

/// Event bus fanning indexer events out to every subscriber.
pub struct EventBus {
	sender: broadcast::Sender<SubgraphEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Creates a new subscriber receiving events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<SubgraphEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers. An event with no
	/// subscribers is dropped, which is not an error for the poller.
	pub fn publish(&self, event: SubgraphEvent) {
		if self.sender.send(event).is_err() {
			tracing::trace!("indexer event dropped, no subscribers");
		}
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}
