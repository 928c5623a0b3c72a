//! Subgraph status poller.
//!
//! Polls the user's transfer records on an interval, diffs per-side
//! status against what was last seen, and publishes one event per
//! transition on the event bus.

use crate::bus::EventBus;
use crate::{RecordStatus, SubgraphInterface, SubgraphTransaction, TransactionSide};
use alloy_primitives::{Address, B256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;
use xbridge_types::{
	SubgraphEvent, TransactionCancelledEvent, TransactionData, TransactionFulfilledEvent,
	TransactionPreparedEvent,
};

/// Periodic poller feeding the SDK event surface.
pub struct SubgraphPoller {
	subgraph: Arc<dyn SubgraphInterface>,
	bus: EventBus,
	user: Address,
	interval: Duration,
	stop: Mutex<Option<broadcast::Sender<()>>>,
}

impl SubgraphPoller {
	pub fn new(
		subgraph: Arc<dyn SubgraphInterface>,
		bus: EventBus,
		user: Address,
		interval: Duration,
	) -> Self {
		Self {
			subgraph,
			bus,
			user,
			interval,
			stop: Mutex::new(None),
		}
	}

	/// Starts the polling task. A second call while running is a no-op.
	pub async fn start(&self) {
		let mut stop_guard = self.stop.lock().await;
		if stop_guard.is_some() {
			return;
		}
		let (stop_tx, mut stop_rx) = broadcast::channel(1);
		*stop_guard = Some(stop_tx);

		let subgraph = self.subgraph.clone();
		let bus = self.bus.clone();
		let user = self.user;
		let poll_interval = self.interval;

		tokio::spawn(async move {
			let mut seen = HashMap::new();
			let mut ticker = tokio::time::interval(poll_interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				tokio::select! {
					_ = stop_rx.recv() => break,
					_ = ticker.tick() => {
						match subgraph.user_transactions(user).await {
							Ok(records) => {
								for event in events_from(&mut seen, records) {
									bus.publish(event);
								}
							},
							Err(e) => {
								tracing::warn!(error = %e, "subgraph poll failed");
							},
						}
					},
				}
			}
			tracing::debug!("subgraph poller stopped");
		});
	}

	/// Stops the polling task.
	pub async fn stop(&self) {
		if let Some(stop_tx) = self.stop.lock().await.take() {
			let _ = stop_tx.send(());
		}
	}
}

fn prepared_event(record: &SubgraphTransaction) -> TransactionPreparedEvent {
	TransactionPreparedEvent {
		tx_data: tx_data(record),
		caller: record.prepare_caller.unwrap_or_default(),
		encrypted_call_data: record.encrypted_call_data.clone(),
		encoded_bid: record.encoded_bid.clone(),
		bid_signature: record.bid_signature.clone(),
	}
}

fn fulfilled_event(record: &SubgraphTransaction) -> TransactionFulfilledEvent {
	TransactionFulfilledEvent {
		tx_data: tx_data(record),
		signature: record.signature.clone().unwrap_or_default(),
		relayer_fee: record.relayer_fee.unwrap_or_default(),
		call_data: record.call_data.clone().unwrap_or_default(),
		caller: record.fulfill_caller.unwrap_or_default(),
		transaction_hash: record.fulfill_transaction_hash.unwrap_or_default(),
	}
}

fn cancelled_event(record: &SubgraphTransaction) -> TransactionCancelledEvent {
	TransactionCancelledEvent {
		tx_data: tx_data(record),
		caller: record.cancel_caller.unwrap_or_default(),
		transaction_hash: record.cancel_transaction_hash.unwrap_or_default(),
	}
}

fn tx_data(record: &SubgraphTransaction) -> TransactionData {
	TransactionData {
		invariant: record.invariant.clone(),
		amount: record.variant.amount,
		expiry: record.variant.expiry,
		prepared_block_number: record.variant.prepared_block_number,
	}
}

/// Diffs records against the last observed status per (transfer, side)
/// and returns one event per transition, in record order.
fn events_from(
	seen: &mut HashMap<(B256, TransactionSide), RecordStatus>,
	records: Vec<SubgraphTransaction>,
) -> Vec<SubgraphEvent> {
	let mut events = Vec::new();
	for record in records {
		let key = (record.invariant.transaction_id, record.side);
		if seen.get(&key) == Some(&record.status) {
			continue;
		}
		seen.insert(key, record.status);

		let event = match (record.side, record.status) {
			(TransactionSide::Sender, RecordStatus::Prepared) => {
				SubgraphEvent::SenderTransactionPrepared(prepared_event(&record))
			},
			(TransactionSide::Receiver, RecordStatus::Prepared) => {
				SubgraphEvent::ReceiverTransactionPrepared(prepared_event(&record))
			},
			(TransactionSide::Sender, RecordStatus::Fulfilled) => {
				SubgraphEvent::SenderTransactionFulfilled(fulfilled_event(&record))
			},
			(TransactionSide::Receiver, RecordStatus::Fulfilled) => {
				SubgraphEvent::ReceiverTransactionFulfilled(fulfilled_event(&record))
			},
			(TransactionSide::Sender, RecordStatus::Cancelled) => {
				SubgraphEvent::SenderTransactionCancelled(cancelled_event(&record))
			},
			(TransactionSide::Receiver, RecordStatus::Cancelled) => {
				SubgraphEvent::ReceiverTransactionCancelled(cancelled_event(&record))
			},
		};
		events.push(event);
	}
	events
}
