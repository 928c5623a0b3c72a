//! Canonical bid encoding and signature recovery.
//!
//! A router signs the keccak256 hash of its bid's canonical ABI encoding;
//! the SDK recovers the signer and compares it against the router address
//! the bid names. The field order below is part of the protocol and must
//! match what routers and the on-chain contract expect.

use crate::transfer::AuctionBid;
use alloy_primitives::{keccak256, Address, Signature, B256, U256};
use alloy_sol_types::{sol, SolValue};
use thiserror::Error;

sol! {
	/// Canonical bid layout. Field order is load-bearing: it is hashed and
	/// signed by routers and checked by the receiving-chain contract.
	struct SignedBid {
		address user;
		address router;
		address initiator;
		uint256 sendingChainId;
		address sendingAssetId;
		uint256 amount;
		uint256 receivingChainId;
		address receivingAssetId;
		uint256 amountReceived;
		address receivingAddress;
		bytes32 transactionId;
		uint256 expiry;
		bytes32 callDataHash;
		address callTo;
		bytes encryptedCallData;
		uint256 bidExpiry;
	}
}

/// Errors from bid decoding and signature recovery.
#[derive(Debug, Error)]
pub enum EncodingError {
	/// The signature bytes are not a valid 65-byte ECDSA signature, or
	/// recovery failed.
	#[error("invalid signature: {0}")]
	Signature(#[from] alloy_primitives::SignatureError),
	/// The encoded bid bytes do not decode as a bid.
	#[error("invalid encoded bid: {0}")]
	Decode(#[from] alloy_sol_types::Error),
	/// A numeric field does not fit its target type.
	#[error("value out of range for field {0}")]
	ValueOutOfRange(&'static str),
}

impl From<&AuctionBid> for SignedBid {
	fn from(bid: &AuctionBid) -> Self {
		SignedBid {
			user: bid.user,
			router: bid.router,
			initiator: bid.initiator,
			sendingChainId: U256::from(bid.sending_chain_id),
			sendingAssetId: bid.sending_asset_id,
			amount: bid.amount,
			receivingChainId: U256::from(bid.receiving_chain_id),
			receivingAssetId: bid.receiving_asset_id,
			amountReceived: bid.amount_received,
			receivingAddress: bid.receiving_address,
			transactionId: bid.transaction_id,
			expiry: U256::from(bid.expiry),
			callDataHash: bid.call_data_hash,
			callTo: bid.call_to,
			encryptedCallData: bid.encrypted_call_data.clone(),
			bidExpiry: U256::from(bid.bid_expiry),
		}
	}
}

fn to_u64(value: U256, field: &'static str) -> Result<u64, EncodingError> {
	u64::try_from(value).map_err(|_| EncodingError::ValueOutOfRange(field))
}

impl TryFrom<SignedBid> for AuctionBid {
	type Error = EncodingError;

	fn try_from(bid: SignedBid) -> Result<Self, Self::Error> {
		Ok(AuctionBid {
			user: bid.user,
			router: bid.router,
			initiator: bid.initiator,
			sending_chain_id: to_u64(bid.sendingChainId, "sendingChainId")?,
			sending_asset_id: bid.sendingAssetId,
			amount: bid.amount,
			receiving_chain_id: to_u64(bid.receivingChainId, "receivingChainId")?,
			receiving_asset_id: bid.receivingAssetId,
			amount_received: bid.amountReceived,
			receiving_address: bid.receivingAddress,
			transaction_id: bid.transactionId,
			expiry: to_u64(bid.expiry, "expiry")?,
			call_data_hash: bid.callDataHash,
			call_to: bid.callTo,
			encrypted_call_data: bid.encryptedCallData,
			bid_expiry: to_u64(bid.bidExpiry, "bidExpiry")?,
		})
	}
}

/// ABI-encodes a bid in the canonical field order.
pub fn encode_auction_bid(bid: &AuctionBid) -> Vec<u8> {
	SignedBid::from(bid).abi_encode()
}

/// Decodes canonical bid bytes back into a bid.
pub fn decode_auction_bid(data: &[u8]) -> Result<AuctionBid, EncodingError> {
	let decoded = SignedBid::abi_decode(data, true)?;
	AuctionBid::try_from(decoded)
}

/// The 32-byte digest a router signs for a bid.
pub fn hash_auction_bid(bid: &AuctionBid) -> B256 {
	keccak256(encode_auction_bid(bid))
}

/// Recovers the signer of a bid signature.
///
/// Callers compare the result against `bid.router`; a mismatch rejects the
/// bid rather than raising an error.
pub fn recover_bid_signer(bid: &AuctionBid, signature: &[u8]) -> Result<Address, EncodingError> {
	let sig = Signature::try_from(signature)?;
	Ok(sig.recover_address_from_prehash(&hash_auction_bid(bid))?)
}

/// The digest a user signs to authorize a fulfill, directly or through a
/// relayer.
pub fn fulfill_hash_to_sign(
	transaction_id: B256,
	relayer_fee: U256,
	receiving_chain_id: u64,
	tx_manager_address: Address,
) -> B256 {
	let payload = (
		transaction_id,
		relayer_fee,
		U256::from(receiving_chain_id),
		tx_manager_address,
	);
	keccak256(payload.abi_encode())
}

/// Recovers the signer of a fulfill signature.
pub fn recover_fulfill_signer(
	transaction_id: B256,
	relayer_fee: U256,
	receiving_chain_id: u64,
	tx_manager_address: Address,
	signature: &[u8],
) -> Result<Address, EncodingError> {
	let digest = fulfill_hash_to_sign(
		transaction_id,
		relayer_fee,
		receiving_chain_id,
		tx_manager_address,
	);
	let sig = Signature::try_from(signature)?;
	Ok(sig.recover_address_from_prehash(&digest)?)
}
