//! Subgraph record types.
//!
//! The indexer mirrors on-chain transfer state; the SDK treats it as an
//! authoritative read source, guarded by a per-chain staleness check.

use crate::transfer::{InvariantTransactionData, TransferStatus, VariantTransactionData};
use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};

/// Freshness of one chain's subgraph relative to the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphSyncRecord {
	pub synced: bool,
	pub synced_block: u64,
	pub latest_block: u64,
}

impl Default for SubgraphSyncRecord {
	fn default() -> Self {
		Self {
			synced: false,
			synced_block: 0,
			latest_block: 0,
		}
	}
}

impl SubgraphSyncRecord {
	/// Builds a record from observed blocks; the chain is stale when the
	/// subgraph lags the head by more than `buffer` blocks.
	pub fn from_blocks(synced_block: u64, latest_block: u64, buffer: u64) -> Self {
		Self {
			synced: latest_block.saturating_sub(synced_block) <= buffer,
			synced_block,
			latest_block,
		}
	}
}

/// Both sides of a transfer as mirrored by the subgraphs. Either variant
/// side may be absent while the corresponding prepare is unmined or
/// unindexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosschainTransaction {
	pub invariant: InvariantTransactionData,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sending: Option<VariantTransactionData>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub receiving: Option<VariantTransactionData>,
}

/// An in-flight transfer of the user's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTransaction {
	pub crosschain_tx: CrosschainTransaction,
	/// `SenderPrepared` or `ReceiverPrepared`.
	pub status: TransferStatus,
	pub bid_signature: Bytes,
	pub encoded_bid: Bytes,
	pub encrypted_call_data: Bytes,
	pub prepared_timestamp: u64,
}

/// A completed transfer of the user's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTransaction {
	pub crosschain_tx: CrosschainTransaction,
	/// `Fulfilled` or `Cancelled`.
	pub status: TransferStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fulfilled_tx_hash: Option<B256>,
	pub prepared_timestamp: u64,
}
