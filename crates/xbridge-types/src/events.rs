//! Indexer-driven event types.
//!
//! The subgraph poller translates transfer status changes into these events
//! and publishes them on a broadcast bus; the SDK's event surface
//! (attach/attach_once/wait_for) dispatches them to user callbacks.

use crate::transfer::TransactionData;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// A transfer side was prepared on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPreparedEvent {
	pub tx_data: TransactionData,
	/// Address that submitted the prepare.
	pub caller: Address,
	pub encrypted_call_data: Bytes,
	pub encoded_bid: Bytes,
	pub bid_signature: Bytes,
}

/// A transfer side was fulfilled on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFulfilledEvent {
	pub tx_data: TransactionData,
	/// User signature presented to the contract.
	pub signature: Bytes,
	pub relayer_fee: U256,
	/// Plaintext callData executed against `call_to`.
	pub call_data: Bytes,
	pub caller: Address,
	/// Hash of the fulfill transaction.
	pub transaction_hash: B256,
}

/// A transfer side was cancelled on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCancelledEvent {
	pub tx_data: TransactionData,
	pub caller: Address,
	pub transaction_hash: B256,
}

/// All events the indexer surface can deliver, tagged by the chain side
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubgraphEvent {
	SenderTransactionPrepared(TransactionPreparedEvent),
	ReceiverTransactionPrepared(TransactionPreparedEvent),
	SenderTransactionFulfilled(TransactionFulfilledEvent),
	ReceiverTransactionFulfilled(TransactionFulfilledEvent),
	SenderTransactionCancelled(TransactionCancelledEvent),
	ReceiverTransactionCancelled(TransactionCancelledEvent),
}

/// Discriminant for [`SubgraphEvent`], used to key handler registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubgraphEventKind {
	SenderTransactionPrepared,
	ReceiverTransactionPrepared,
	SenderTransactionFulfilled,
	ReceiverTransactionFulfilled,
	SenderTransactionCancelled,
	ReceiverTransactionCancelled,
}

impl SubgraphEvent {
	pub fn kind(&self) -> SubgraphEventKind {
		match self {
			SubgraphEvent::SenderTransactionPrepared(_) => {
				SubgraphEventKind::SenderTransactionPrepared
			},
			SubgraphEvent::ReceiverTransactionPrepared(_) => {
				SubgraphEventKind::ReceiverTransactionPrepared
			},
			SubgraphEvent::SenderTransactionFulfilled(_) => {
				SubgraphEventKind::SenderTransactionFulfilled
			},
			SubgraphEvent::ReceiverTransactionFulfilled(_) => {
				SubgraphEventKind::ReceiverTransactionFulfilled
			},
			SubgraphEvent::SenderTransactionCancelled(_) => {
				SubgraphEventKind::SenderTransactionCancelled
			},
			SubgraphEvent::ReceiverTransactionCancelled(_) => {
				SubgraphEventKind::ReceiverTransactionCancelled
			},
		}
	}

	/// The transfer id the event belongs to.
	pub fn transaction_id(&self) -> B256 {
		match self {
			SubgraphEvent::SenderTransactionPrepared(e)
			| SubgraphEvent::ReceiverTransactionPrepared(e) => {
				e.tx_data.invariant.transaction_id
			},
			SubgraphEvent::SenderTransactionFulfilled(e)
			| SubgraphEvent::ReceiverTransactionFulfilled(e) => {
				e.tx_data.invariant.transaction_id
			},
			SubgraphEvent::SenderTransactionCancelled(e)
			| SubgraphEvent::ReceiverTransactionCancelled(e) => {
				e.tx_data.invariant.transaction_id
			},
		}
	}
}
