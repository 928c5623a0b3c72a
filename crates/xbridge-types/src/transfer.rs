//! Core transfer data model for the xbridge SDK.
//!
//! A cross-chain transfer is described by an invariant part that is
//! identical on both chains and covered by the router's bid signature, and
//! a variant part (amount, expiry, prepared block) that differs per chain.
//! The types here are the wire- and call-level structures exchanged with
//! routers during the auction and handed to the caller as ready-to-submit
//! transaction requests.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The portion of a transfer that must be identical on the sending and
/// receiving chains.
///
/// Every field here is covered by the router's bid signature; a mismatch on
/// either chain makes the transfer unfulfillable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantTransactionData {
	/// Transaction manager contract on the receiving chain.
	pub receiving_chain_tx_manager_address: Address,
	/// The user transferring value.
	pub user: Address,
	/// The router fronting liquidity on the receiving chain.
	pub router: Address,
	/// The address that submitted the sending-chain prepare.
	pub initiator: Address,
	/// Asset the user locks on the sending chain.
	pub sending_asset_id: Address,
	/// Asset the router delivers on the receiving chain.
	pub receiving_asset_id: Address,
	/// Where sending-chain funds return on cancellation. Always the user.
	pub sending_chain_fallback: Address,
	/// Contract to call with the decrypted callData on fulfill, or zero.
	pub call_to: Address,
	/// Recipient of funds on the receiving chain.
	pub receiving_address: Address,
	/// Chain the user sends from.
	pub sending_chain_id: u64,
	/// Chain the user receives on.
	pub receiving_chain_id: u64,
	/// keccak256 of the plaintext callData.
	pub call_data_hash: B256,
	/// User-chosen transfer identifier. MUST be unique per user: reuse
	/// allows the fulfill signature to be replayed and funds to be lost.
	pub transaction_id: B256,
}

/// The per-chain portion of a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantTransactionData {
	/// Amount locked on this chain.
	pub amount: U256,
	/// Unix timestamp after which this side can be cancelled.
	pub expiry: u64,
	/// Block at which the prepare was mined.
	pub prepared_block_number: u64,
}

/// Full transaction data as it appears in on-chain events: the invariant
/// part plus the variant fields of the chain the event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
	#[serde(flatten)]
	pub invariant: InvariantTransactionData,
	pub amount: U256,
	pub expiry: u64,
	pub prepared_block_number: u64,
}

/// A router's offer in the auction: what it will deliver on the receiving
/// chain and under which terms. Canonically encoded for signature recovery
/// by [`crate::utils::encode_auction_bid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionBid {
	pub user: Address,
	pub router: Address,
	pub initiator: Address,
	pub sending_chain_id: u64,
	pub sending_asset_id: Address,
	/// Amount the user locks on the sending chain.
	pub amount: U256,
	pub receiving_chain_id: u64,
	pub receiving_asset_id: Address,
	/// Amount the router commits to deliver on the receiving chain.
	pub amount_received: U256,
	pub receiving_address: Address,
	pub transaction_id: B256,
	/// Sending-chain expiry the router will prepare against.
	pub expiry: u64,
	pub call_data_hash: B256,
	pub call_to: Address,
	/// callData encrypted to the user's wallet key, or `0x`.
	pub encrypted_call_data: Bytes,
	/// Unix timestamp after which this bid is no longer valid.
	pub bid_expiry: u64,
}

/// A bid together with the router's signature over its canonical encoding
/// and the router's gas fee quote, as delivered on the auction response
/// subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionResponse {
	pub bid: AuctionBid,
	/// 65-byte ECDSA signature over `keccak256(encode_auction_bid(bid))`.
	/// Empty for dry-run responses.
	pub bid_signature: Bytes,
	/// Gas cost of the receiving-chain fulfill, denominated in the
	/// receiving asset.
	pub gas_fee_in_receiving_token: U256,
}

/// Parameters for constructing the sending-chain prepare call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareParams {
	pub tx_data: InvariantTransactionData,
	pub amount: U256,
	pub expiry: u64,
	pub encrypted_call_data: Bytes,
	pub bid_signature: Bytes,
	pub encoded_bid: Bytes,
}

/// Parameters for constructing a receiving-chain fulfill call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillParams {
	pub tx_data: TransactionData,
	/// Fee paid to the relayer submitting on the user's behalf, in the
	/// receiving asset.
	pub relayer_fee: U256,
	/// User signature over the fulfill hash, computed out-of-band.
	pub signature: Bytes,
	/// Decrypted plaintext callData; must hash to `call_data_hash`.
	pub call_data: Bytes,
}

/// Parameters for constructing a cancel call on either chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelParams {
	pub tx_data: TransactionData,
	/// User cancel signature. May be empty when the expiry has elapsed and
	/// anyone can cancel.
	pub signature: Bytes,
}

/// A user's quote request: the input to `get_transfer_quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosschainTransferParams {
	pub user: Address,
	pub sending_chain_id: u64,
	pub sending_asset_id: Address,
	pub receiving_chain_id: u64,
	pub receiving_asset_id: Address,
	/// Amount to lock on the sending chain.
	pub amount: U256,
	pub receiving_address: Address,
	/// Decimal percent string with two fractional digits, e.g. "0.10".
	pub slippage_tolerance: String,
	/// Sending-chain expiry. Defaults to now + 72h when absent.
	#[serde(default)]
	pub expiry: Option<u64>,
	/// Transfer id. Generated when absent; see
	/// [`InvariantTransactionData::transaction_id`] for the uniqueness
	/// requirement when supplying one.
	#[serde(default)]
	pub transaction_id: Option<B256>,
	/// Contract to call on the receiving chain, or zero for a plain
	/// transfer.
	#[serde(default)]
	pub call_to: Option<Address>,
	/// Hex-encoded calldata for `call_to`, `0x` for none.
	#[serde(default)]
	pub call_data: Option<String>,
	/// Restrict the auction to these routers.
	#[serde(default)]
	pub preferred_routers: Vec<Address>,
	/// Accept the first responding bid without validation.
	#[serde(default)]
	pub dry_run: bool,
}

/// A chain call ready for the caller to sign and submit. The SDK never
/// submits transactions itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRequest {
	pub to: Address,
	pub data: Bytes,
	pub value: U256,
	pub chain_id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_limit: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<u128>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nonce: Option<u64>,
}

/// Lifecycle of one transfer as observed by the orchestrator and the
/// indexer.
///
/// ```text
/// Quoting -> Quoted -> SenderPrepared -> ReceiverPrepared -> Fulfilled
/// *Prepared -> Cancelled        Quoting -> Failed
/// ```
///
/// `Fulfilled`, `Cancelled` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
	Quoting,
	Quoted,
	SenderPrepared,
	ReceiverPrepared,
	Fulfilled,
	Cancelled,
	Failed,
}

impl TransferStatus {
	/// Whether no further transitions are possible from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			TransferStatus::Fulfilled | TransferStatus::Cancelled | TransferStatus::Failed
		)
	}
}
