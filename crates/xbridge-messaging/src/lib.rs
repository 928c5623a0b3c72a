//! Message-bus port for the xbridge SDK.
//!
//! Auction and meta-transaction traffic travels over a subject-addressed
//! pub/sub fabric. The fabric itself (a NATS cluster in production) is an
//! external collaborator; this module defines the port the SDK programs
//! against plus an in-memory implementation used by tests and local
//! deployments. Production bus clients implement [`MessagingInterface`]
//! and are injected at SDK construction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

/// Logical subject names carrying SDK traffic.
pub mod subjects {
	/// Auction requests, published by the SDK, consumed by routers.
	pub const AUCTION_REQUEST: &str = "auction.request";
	/// Auction responses, published by routers, addressed by inbox.
	pub const AUCTION_RESPONSE: &str = "auction.response";
	/// Meta-transaction requests, published by the SDK for relayers.
	pub const METATX_REQUEST: &str = "metatx.request";
}

/// Buffered messages per subject before the oldest are dropped.
const SUBJECT_CAPACITY: usize = 256;

/// Errors that can occur on the bus port.
#[derive(Debug, Error)]
pub enum MessagingError {
	/// An operation ran before `connect`.
	#[error("messaging is not connected")]
	NotConnected,
	/// The underlying fabric rejected a publish.
	#[error("publish failed on {subject}: {message}")]
	Publish { subject: String, message: String },
	/// The underlying fabric rejected a subscription.
	#[error("subscribe failed on {subject}: {message}")]
	Subscribe { subject: String, message: String },
}

/// Trait defining the bus port.
///
/// `connect` is idempotent: a second call observes the same session. All
/// payloads are JSON values; typed envelopes live in `xbridge-types`.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait MessagingInterface: Send + Sync {
	/// Establishes the bus session. A no-op when already connected.
	async fn connect(&self) -> Result<(), MessagingError>;

	fn is_connected(&self) -> bool;

	/// Monotonic id of the current session; stable across repeated
	/// `connect` calls.
	fn session(&self) -> u64;

	async fn publish(
		&self,
		subject: &str,
		payload: serde_json::Value,
	) -> Result<(), MessagingError>;

	/// Subscribes to a subject. Messages published before the
	/// subscription are not replayed.
	async fn subscribe(
		&self,
		subject: &str,
	) -> Result<broadcast::Receiver<serde_json::Value>, MessagingError>;
}

/// In-process bus over per-subject broadcast channels.
///
/// Semantics match the production fabric where the SDK depends on them:
/// no replay for late subscribers, publishes to subjects without
/// subscribers vanish silently.
pub struct InMemoryMessaging {
	session: AtomicU64,
	channels: Mutex<HashMap<String, broadcast::Sender<serde_json::Value>>>,
}

impl InMemoryMessaging {
	pub fn new() -> Self {
		Self {
			session: AtomicU64::new(0),
			channels: Mutex::new(HashMap::new()),
		}
	}

	async fn sender(&self, subject: &str) -> broadcast::Sender<serde_json::Value> {
		let mut channels = self.channels.lock().await;
		channels
			.entry(subject.to_string())
			.or_insert_with(|| broadcast::channel(SUBJECT_CAPACITY).0)
			.clone()
	}
}

impl Default for InMemoryMessaging {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl MessagingInterface for InMemoryMessaging {
	async fn connect(&self) -> Result<(), MessagingError> {
		// First connect opens session 1; later calls keep it.
		let _ = self
			.session
			.compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst);
		Ok(())
	}

	fn is_connected(&self) -> bool {
		self.session.load(Ordering::SeqCst) != 0
	}

	fn session(&self) -> u64 {
		self.session.load(Ordering::SeqCst)
	}

	async fn publish(
		&self,
		subject: &str,
		payload: serde_json::Value,
	) -> Result<(), MessagingError> {
		if !self.is_connected() {
			return Err(MessagingError::NotConnected);
		}
		let sender = self.sender(subject).await;
		if sender.send(payload).is_err() {
			tracing::debug!(subject, "publish with no subscribers dropped");
		}
		Ok(())
	}

	async fn subscribe(
		&self,
		subject: &str,
	) -> Result<broadcast::Receiver<serde_json::Value>, MessagingError> {
		if !self.is_connected() {
			return Err(MessagingError::NotConnected);
		}
		Ok(self.sender(subject).await.subscribe())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_connect_is_idempotent() {
		let bus = InMemoryMessaging::new();
		assert!(!bus.is_connected());

		bus.connect().await.unwrap();
		let first = bus.session();
		bus.connect().await.unwrap();

		// Same session both times.
		assert_eq!(bus.session(), first);
		assert!(bus.is_connected());
	}

	#[tokio::test]
	async fn test_publish_before_connect_fails() {
		let bus = InMemoryMessaging::new();
		let result = bus.publish(subjects::AUCTION_REQUEST, json!({})).await;
		assert!(matches!(result, Err(MessagingError::NotConnected)));
	}

	#[tokio::test]
	async fn test_publish_reaches_subscriber() {
		let bus = InMemoryMessaging::new();
		bus.connect().await.unwrap();

		let mut rx = bus.subscribe(subjects::AUCTION_RESPONSE).await.unwrap();
		bus.publish(subjects::AUCTION_RESPONSE, json!({"inbox": "0xabc"}))
			.await
			.unwrap();

		let msg = rx.recv().await.unwrap();
		assert_eq!(msg["inbox"], "0xabc");
	}

	#[tokio::test]
	async fn test_subjects_are_isolated() {
		let bus = InMemoryMessaging::new();
		bus.connect().await.unwrap();

		let mut responses = bus.subscribe(subjects::AUCTION_RESPONSE).await.unwrap();
		bus.publish(subjects::METATX_REQUEST, json!({"type": "Fulfill"}))
			.await
			.unwrap();
		bus.publish(subjects::AUCTION_RESPONSE, json!({"inbox": "0x1"}))
			.await
			.unwrap();

		// Only the response-subject message arrives.
		let msg = responses.recv().await.unwrap();
		assert_eq!(msg["inbox"], "0x1");
		assert!(responses.try_recv().is_err());
	}

	#[tokio::test]
	async fn test_no_replay_for_late_subscribers() {
		let bus = InMemoryMessaging::new();
		bus.connect().await.unwrap();

		// Nobody listening yet; the message is dropped.
		bus.publish(subjects::AUCTION_RESPONSE, json!({"inbox": "0xearly"}))
			.await
			.unwrap();

		let mut rx = bus.subscribe(subjects::AUCTION_RESPONSE).await.unwrap();
		assert!(rx.try_recv().is_err());
	}
}
