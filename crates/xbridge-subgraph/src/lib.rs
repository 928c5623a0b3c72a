//! Indexer read port for the xbridge SDK.
//!
//! The subgraphs mirror on-chain transfer state per chain. This module
//! reads them over GraphQL, tracks per-chain freshness against the chain
//! head, classifies a user's transfers into active and historical sets,
//! and runs the status poller that feeds the SDK event surface.

/// Broadcast bus carrying indexer events to the SDK event surface.
pub mod bus;
/// GraphQL reader implementation.
pub mod http;
/// Status poller translating record changes into events.
pub mod poller;
/// GraphQL documents and wire-record parsing.
pub mod queries;

pub use bus::EventBus;
pub use http::HttpSubgraph;
pub use poller::SubgraphPoller;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use thiserror::Error;
use xbridge_types::{
	ActiveTransaction, CrosschainTransaction, HistoricalTransaction, InvariantTransactionData,
	SubgraphSyncRecord, TransferStatus, VariantTransactionData,
};

/// Errors that can occur on the indexer port.
#[derive(Debug, Error)]
pub enum SubgraphError {
	/// Transport failure against every endpoint of a chain.
	#[error("subgraph request failed for chain {chain_id}: {message}")]
	Http { chain_id: u64, message: String },
	/// The endpoint answered with GraphQL-level errors.
	#[error("graphql error for chain {chain_id}: {message}")]
	GraphQl { chain_id: u64, message: String },
	/// A record field failed to parse into its typed form.
	#[error("bad subgraph record: {0}")]
	Decode(String),
	/// The chain has no subgraph configured.
	#[error("chain {0} is not configured")]
	ChainNotConfigured(u64),
}

/// Which side of a transfer a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionSide {
	Sender,
	Receiver,
}

/// On-chain status of one transfer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
	Prepared,
	Fulfilled,
	Cancelled,
}

/// One chain's fully-typed record of a transfer side.
#[derive(Debug, Clone)]
pub struct SubgraphTransaction {
	pub chain_id: u64,
	pub side: TransactionSide,
	pub status: RecordStatus,
	pub invariant: InvariantTransactionData,
	pub variant: VariantTransactionData,
	pub encrypted_call_data: Bytes,
	pub encoded_bid: Bytes,
	pub bid_signature: Bytes,
	pub relayer_fee: Option<U256>,
	pub signature: Option<Bytes>,
	pub call_data: Option<Bytes>,
	pub prepare_caller: Option<Address>,
	pub fulfill_caller: Option<Address>,
	pub cancel_caller: Option<Address>,
	pub fulfill_transaction_hash: Option<B256>,
	pub cancel_transaction_hash: Option<B256>,
	pub prepared_timestamp: u64,
}

/// Trait defining the indexer port.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SubgraphInterface: Send + Sync {
	/// Current freshness of one chain's subgraph. Unknown chains and
	/// failed reads report the default unsynced record.
	async fn sync_status(&self, chain_id: u64) -> SubgraphSyncRecord;

	/// Every record of the user's transfers across all configured chains.
	async fn user_transactions(
		&self,
		user: Address,
	) -> Result<Vec<SubgraphTransaction>, SubgraphError>;

	/// The user's in-flight transfers.
	async fn active_transactions(
		&self,
		user: Address,
	) -> Result<Vec<ActiveTransaction>, SubgraphError> {
		Ok(classify(self.user_transactions(user).await?).0)
	}

	/// The user's completed transfers.
	async fn historical_transactions(
		&self,
		user: Address,
	) -> Result<Vec<HistoricalTransaction>, SubgraphError> {
		Ok(classify(self.user_transactions(user).await?).1)
	}
}

/// Splits per-chain records into the user-facing active and historical
/// sets, pairing sender and receiver sides by transaction id.
pub fn classify(
	records: Vec<SubgraphTransaction>,
) -> (Vec<ActiveTransaction>, Vec<HistoricalTransaction>) {
	let mut active = Vec::new();
	let mut historical = Vec::new();

	let receivers: Vec<&SubgraphTransaction> = records
		.iter()
		.filter(|r| r.side == TransactionSide::Receiver)
		.collect();

	for sender in records.iter().filter(|r| r.side == TransactionSide::Sender) {
		let receiver = receivers
			.iter()
			.find(|r| r.invariant.transaction_id == sender.invariant.transaction_id);

		let crosschain_tx = CrosschainTransaction {
			invariant: sender.invariant.clone(),
			sending: Some(sender.variant.clone()),
			receiving: receiver.map(|r| r.variant.clone()),
		};

		match (sender.status, receiver.map(|r| r.status)) {
			// A fulfilled receiver side completes the transfer for the
			// user regardless of the sender side's claim status.
			(_, Some(RecordStatus::Fulfilled)) => historical.push(HistoricalTransaction {
				crosschain_tx,
				status: TransferStatus::Fulfilled,
				fulfilled_tx_hash: receiver.and_then(|r| r.fulfill_transaction_hash),
				prepared_timestamp: sender.prepared_timestamp,
			}),
			(RecordStatus::Cancelled, _) => historical.push(HistoricalTransaction {
				crosschain_tx,
				status: TransferStatus::Cancelled,
				fulfilled_tx_hash: None,
				prepared_timestamp: sender.prepared_timestamp,
			}),
			(RecordStatus::Prepared, Some(RecordStatus::Prepared)) => {
				active.push(ActiveTransaction {
					crosschain_tx,
					status: TransferStatus::ReceiverPrepared,
					bid_signature: sender.bid_signature.clone(),
					encoded_bid: sender.encoded_bid.clone(),
					encrypted_call_data: sender.encrypted_call_data.clone(),
					prepared_timestamp: sender.prepared_timestamp,
				})
			},
			// Receiver missing or already cancelled: the sender side is
			// still locked and actionable.
			(RecordStatus::Prepared, _) => active.push(ActiveTransaction {
				crosschain_tx: CrosschainTransaction {
					receiving: None,
					..crosschain_tx
				},
				status: TransferStatus::SenderPrepared,
				bid_signature: sender.bid_signature.clone(),
				encoded_bid: sender.encoded_bid.clone(),
				encrypted_call_data: sender.encrypted_call_data.clone(),
				prepared_timestamp: sender.prepared_timestamp,
			}),
			(RecordStatus::Fulfilled, _) => historical.push(HistoricalTransaction {
				crosschain_tx,
				status: TransferStatus::Fulfilled,
				fulfilled_tx_hash: sender.fulfill_transaction_hash,
				prepared_timestamp: sender.prepared_timestamp,
			}),
		}
	}

	(active, historical)
}
