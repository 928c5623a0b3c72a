//! Message-bus payload types.
//!
//! Three logical subjects carry all off-chain traffic: auction requests
//! (published by the SDK), auction responses (published by routers,
//! addressed to a per-auction inbox), and meta-transaction requests
//! (published by the SDK for relayers to pick up).

use crate::transfer::{AuctionResponse, TransactionData};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The transfer terms broadcast to routers at auction start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionPayload {
	pub user: Address,
	pub initiator: Address,
	pub sending_chain_id: u64,
	pub sending_asset_id: Address,
	pub amount: U256,
	pub receiving_chain_id: u64,
	pub receiving_asset_id: Address,
	pub receiving_address: Address,
	pub call_to: Address,
	pub call_data_hash: B256,
	pub encrypted_call_data: Bytes,
	pub expiry: u64,
	pub transaction_id: B256,
	pub dry_run: bool,
}

/// Envelope published on the auction request subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRequestMessage {
	/// Ephemeral reply address, unique per auction.
	pub inbox_id: String,
	pub payload: AuctionPayload,
}

/// Envelope delivered on the shared auction response subject.
///
/// A message carries either a bid (`data`) or a router-side error (`err`);
/// error responses are logged and never count toward the bid set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionResponseMessage {
	pub inbox: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<AuctionResponse>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub err: Option<String>,
}

/// Kinds of chain call a relayer can submit on the user's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaTxType {
	Fulfill,
}

/// The fulfill payload a relayer needs to build the chain call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTxFulfillData {
	pub tx_data: TransactionData,
	pub signature: Bytes,
	pub call_data: Bytes,
	pub relayer_fee: U256,
}

/// Envelope published on the meta-transaction request subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTxRequestMessage {
	#[serde(rename = "type")]
	pub transaction_type: MetaTxType,
	pub relayer_fee: U256,
	/// Transaction manager the relayer must call.
	pub to: Address,
	pub chain_id: u64,
	pub data: MetaTxFulfillData,
}
