//! Event subscription surface.
//!
//! User code observes transfer progress through handler registrations on
//! the indexer event bus: `attach` for persistent callbacks, `attach_once`
//! for one-shot callbacks, `wait_for` as the awaitable coordination
//! primitive the relayed-fulfill path uses, and `detach` to unregister.
//! Events delivered before a registration existed are never replayed.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{timeout_at, Instant};
use xbridge_subgraph::EventBus;
use xbridge_types::{SubgraphEvent, SubgraphEventKind};

/// Error from [`EventMux::wait_for`].
#[derive(Debug, Error)]
pub enum WaitError {
	#[error("timed out waiting for event")]
	Timeout,
}

/// Predicate narrowing a registration to matching events.
pub type EventFilter = Box<dyn Fn(&SubgraphEvent) -> bool + Send + Sync>;

/// Callback invoked with each matching event. Shared so dispatch can run
/// callbacks outside the registration lock, letting a callback attach or
/// detach handlers itself.
pub type EventCallback = Arc<dyn Fn(SubgraphEvent) + Send + Sync>;

struct Handler {
	once: bool,
	expires_at: Option<Instant>,
	filter: Option<EventFilter>,
	callback: EventCallback,
}

type HandlerMap = HashMap<SubgraphEventKind, Vec<Handler>>;

/// Multiplexes indexer events onto scoped handler registrations.
pub struct EventMux {
	bus: EventBus,
	handlers: Arc<Mutex<HandlerMap>>,
}

impl EventMux {
	/// Creates the mux and starts its dispatch task. Must be called from
	/// within a tokio runtime.
	pub fn new(bus: EventBus) -> Self {
		let handlers: Arc<Mutex<HandlerMap>> = Arc::new(Mutex::new(HashMap::new()));

		let mut rx = bus.subscribe();
		let dispatch_handlers = handlers.clone();
		tokio::spawn(async move {
			loop {
				match rx.recv().await {
					Ok(event) => dispatch(&dispatch_handlers, event),
					Err(broadcast::error::RecvError::Lagged(missed)) => {
						tracing::warn!(missed, "event dispatcher lagged");
					},
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		});

		Self { bus, handlers }
	}

	/// Registers a persistent callback for an event kind.
	pub fn attach<F>(&self, kind: SubgraphEventKind, callback: F)
	where
		F: Fn(SubgraphEvent) + Send + Sync + 'static,
	{
		self.register(kind, false, None, None, Arc::new(callback));
	}

	/// Registers a persistent callback that only sees matching events.
	pub fn attach_filtered<F>(&self, kind: SubgraphEventKind, filter: EventFilter, callback: F)
	where
		F: Fn(SubgraphEvent) + Send + Sync + 'static,
	{
		self.register(kind, false, None, Some(filter), Arc::new(callback));
	}

	/// Registers a callback removed after its first delivery. An expired
	/// registration that never fired is dropped silently.
	pub fn attach_once<F>(
		&self,
		kind: SubgraphEventKind,
		filter: Option<EventFilter>,
		timeout: Option<Duration>,
		callback: F,
	) where
		F: Fn(SubgraphEvent) + Send + Sync + 'static,
	{
		let expires_at = timeout.map(|t| Instant::now() + t);
		self.register(kind, true, expires_at, filter, Arc::new(callback));
	}

	/// Resolves to the first matching event registered from now on, or
	/// times out. The subscription is live before this returns, so an
	/// event published immediately after the call cannot be missed.
	pub fn wait_for(
		&self,
		kind: SubgraphEventKind,
		timeout: Duration,
		filter: Option<EventFilter>,
	) -> impl Future<Output = Result<SubgraphEvent, WaitError>> + Send {
		let mut rx = self.bus.subscribe();
		async move {
			let deadline = Instant::now() + timeout;
			loop {
				match timeout_at(deadline, rx.recv()).await {
					Err(_) => return Err(WaitError::Timeout),
					Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
					Ok(Err(broadcast::error::RecvError::Closed)) => {
						return Err(WaitError::Timeout)
					},
					Ok(Ok(event)) => {
						if event.kind() == kind
							&& filter.as_ref().map_or(true, |f| f(&event))
						{
							return Ok(event);
						}
					},
				}
			}
		}
	}

	/// Removes registrations for one event kind, or every registration
	/// when `kind` is `None`. Idempotent.
	pub fn detach(&self, kind: Option<SubgraphEventKind>) {
		let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
		match kind {
			Some(kind) => {
				handlers.remove(&kind);
			},
			None => handlers.clear(),
		}
	}

	fn register(
		&self,
		kind: SubgraphEventKind,
		once: bool,
		expires_at: Option<Instant>,
		filter: Option<EventFilter>,
		callback: EventCallback,
	) {
		self.handlers
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.entry(kind)
			.or_default()
			.push(Handler {
				once,
				expires_at,
				filter,
				callback,
			});
	}
}

fn dispatch(handlers: &Arc<Mutex<HandlerMap>>, event: SubgraphEvent) {
	// Callbacks run after the lock is released so they may attach or
	// detach handlers themselves.
	let mut to_run: Vec<EventCallback> = Vec::new();
	{
		let mut handlers = handlers.lock().unwrap_or_else(PoisonError::into_inner);
		let Some(list) = handlers.get_mut(&event.kind()) else {
			return;
		};
		let now = Instant::now();
		list.retain(|handler| {
			if handler.expires_at.is_some_and(|at| at <= now) {
				return false;
			}
			if handler.filter.as_ref().map_or(true, |f| f(&event)) {
				to_run.push(handler.callback.clone());
				!handler.once
			} else {
				true
			}
		});
	}
	for callback in to_run {
		callback(event.clone());
	}
}
