//! GraphQL documents and wire-record parsing.
//!
//! Subgraph responses carry every numeric and binary field as a string;
//! parsing into the typed record is the trust boundary between the indexer
//! and the SDK, so every field failure names its path.

use crate::{RecordStatus, SubgraphError, SubgraphTransaction, TransactionSide};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::Deserialize;
use std::str::FromStr;
use xbridge_types::{InvariantTransactionData, VariantTransactionData};

/// Fetches the subgraph's view of the chain head.
pub const SYNC_STATUS_QUERY: &str = r#"
query SyncStatus {
	_meta {
		block {
			number
		}
	}
}"#;

/// Fetches every transfer record of a user on one chain.
pub const USER_TRANSACTIONS_QUERY: &str = r#"
query UserTransactions($user: String!) {
	transactions(
		where: { user: $user }
		orderBy: preparedTimestamp
		orderDirection: desc
	) {
		id
		status
		chainId
		preparedTimestamp
		receivingChainTxManagerAddress
		user
		router
		initiator
		sendingAssetId
		receivingAssetId
		sendingChainFallback
		callTo
		receivingAddress
		callDataHash
		transactionId
		sendingChainId
		receivingChainId
		amount
		expiry
		preparedBlockNumber
		encryptedCallData
		encodedBid
		bidSignature
		relayerFee
		signature
		callData
		prepareCaller
		fulfillCaller
		cancelCaller
		fulfillTransactionHash
		cancelTransactionHash
	}
}"#;

#[derive(Debug, Deserialize)]
pub struct SyncStatusData {
	#[serde(rename = "_meta")]
	pub meta: SyncMeta,
}

#[derive(Debug, Deserialize)]
pub struct SyncMeta {
	pub block: SyncBlock,
}

#[derive(Debug, Deserialize)]
pub struct SyncBlock {
	pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsData {
	pub transactions: Vec<GqlTransaction>,
}

/// A transfer record as the subgraph serves it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlTransaction {
	pub id: String,
	pub status: String,
	pub chain_id: String,
	pub prepared_timestamp: String,
	pub receiving_chain_tx_manager_address: String,
	pub user: String,
	pub router: String,
	pub initiator: String,
	pub sending_asset_id: String,
	pub receiving_asset_id: String,
	pub sending_chain_fallback: String,
	pub call_to: String,
	pub receiving_address: String,
	pub call_data_hash: String,
	pub transaction_id: String,
	pub sending_chain_id: String,
	pub receiving_chain_id: String,
	pub amount: String,
	pub expiry: String,
	pub prepared_block_number: String,
	pub encrypted_call_data: String,
	pub encoded_bid: String,
	pub bid_signature: String,
	#[serde(default)]
	pub relayer_fee: Option<String>,
	#[serde(default)]
	pub signature: Option<String>,
	#[serde(default)]
	pub call_data: Option<String>,
	#[serde(default)]
	pub prepare_caller: Option<String>,
	#[serde(default)]
	pub fulfill_caller: Option<String>,
	#[serde(default)]
	pub cancel_caller: Option<String>,
	#[serde(default)]
	pub fulfill_transaction_hash: Option<String>,
	#[serde(default)]
	pub cancel_transaction_hash: Option<String>,
}

fn bad(field: &str, value: &str) -> SubgraphError {
	SubgraphError::Decode(format!("field {} has bad value {:?}", field, value))
}

fn parse_address(field: &str, value: &str) -> Result<Address, SubgraphError> {
	Address::from_str(value).map_err(|_| bad(field, value))
}

fn parse_b256(field: &str, value: &str) -> Result<B256, SubgraphError> {
	B256::from_str(value).map_err(|_| bad(field, value))
}

fn parse_u256(field: &str, value: &str) -> Result<U256, SubgraphError> {
	U256::from_str(value).map_err(|_| bad(field, value))
}

fn parse_u64(field: &str, value: &str) -> Result<u64, SubgraphError> {
	value.parse::<u64>().map_err(|_| bad(field, value))
}

fn parse_bytes(field: &str, value: &str) -> Result<Bytes, SubgraphError> {
	let stripped = value.strip_prefix("0x").unwrap_or(value);
	hex::decode(stripped)
		.map(Bytes::from)
		.map_err(|_| bad(field, value))
}

fn opt<T>(
	field: &str,
	value: &Option<String>,
	parse: impl Fn(&str, &str) -> Result<T, SubgraphError>,
) -> Result<Option<T>, SubgraphError> {
	match value {
		Some(v) if !v.is_empty() => parse(field, v).map(Some),
		_ => Ok(None),
	}
}

impl GqlTransaction {
	/// Parses into the typed record. `chain_id` is the chain whose
	/// subgraph served the record and determines the transfer side.
	pub fn into_record(self) -> Result<SubgraphTransaction, SubgraphError> {
		let chain_id = parse_u64("chainId", &self.chain_id)?;
		let sending_chain_id = parse_u64("sendingChainId", &self.sending_chain_id)?;
		let receiving_chain_id = parse_u64("receivingChainId", &self.receiving_chain_id)?;

		let side = if chain_id == sending_chain_id {
			TransactionSide::Sender
		} else if chain_id == receiving_chain_id {
			TransactionSide::Receiver
		} else {
			return Err(SubgraphError::Decode(format!(
				"record chain {} is neither side of transfer {}",
				chain_id, self.transaction_id
			)));
		};

		let status = match self.status.as_str() {
			"Prepared" => RecordStatus::Prepared,
			"Fulfilled" => RecordStatus::Fulfilled,
			"Cancelled" => RecordStatus::Cancelled,
			other => return Err(bad("status", other)),
		};

		Ok(SubgraphTransaction {
			chain_id,
			side,
			status,
			invariant: InvariantTransactionData {
				receiving_chain_tx_manager_address: parse_address(
					"receivingChainTxManagerAddress",
					&self.receiving_chain_tx_manager_address,
				)?,
				user: parse_address("user", &self.user)?,
				router: parse_address("router", &self.router)?,
				initiator: parse_address("initiator", &self.initiator)?,
				sending_asset_id: parse_address("sendingAssetId", &self.sending_asset_id)?,
				receiving_asset_id: parse_address(
					"receivingAssetId",
					&self.receiving_asset_id,
				)?,
				sending_chain_fallback: parse_address(
					"sendingChainFallback",
					&self.sending_chain_fallback,
				)?,
				call_to: parse_address("callTo", &self.call_to)?,
				receiving_address: parse_address(
					"receivingAddress",
					&self.receiving_address,
				)?,
				sending_chain_id,
				receiving_chain_id,
				call_data_hash: parse_b256("callDataHash", &self.call_data_hash)?,
				transaction_id: parse_b256("transactionId", &self.transaction_id)?,
			},
			variant: VariantTransactionData {
				amount: parse_u256("amount", &self.amount)?,
				expiry: parse_u64("expiry", &self.expiry)?,
				prepared_block_number: parse_u64(
					"preparedBlockNumber",
					&self.prepared_block_number,
				)?,
			},
			encrypted_call_data: parse_bytes("encryptedCallData", &self.encrypted_call_data)?,
			encoded_bid: parse_bytes("encodedBid", &self.encoded_bid)?,
			bid_signature: parse_bytes("bidSignature", &self.bid_signature)?,
			relayer_fee: opt("relayerFee", &self.relayer_fee, parse_u256)?,
			signature: opt("signature", &self.signature, parse_bytes)?,
			call_data: opt("callData", &self.call_data, parse_bytes)?,
			prepare_caller: opt("prepareCaller", &self.prepare_caller, parse_address)?,
			fulfill_caller: opt("fulfillCaller", &self.fulfill_caller, parse_address)?,
			cancel_caller: opt("cancelCaller", &self.cancel_caller, parse_address)?,
			fulfill_transaction_hash: opt(
				"fulfillTransactionHash",
				&self.fulfill_transaction_hash,
				parse_b256,
			)?,
			cancel_transaction_hash: opt(
				"cancelTransactionHash",
				&self.cancel_transaction_hash,
				parse_b256,
			)?,
			prepared_timestamp: parse_u64("preparedTimestamp", &self.prepared_timestamp)?,
		})
	}
}
