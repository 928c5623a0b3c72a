//! Structural validation of user-facing call parameters.
//!
//! Every public SDK operation runs its inputs through one of these
//! predicates before any I/O, so a malformed call never reaches the bus or
//! a chain.

use crate::error::SdkError;
use alloy_primitives::B256;
use rust_decimal::Decimal;
use std::str::FromStr;
use xbridge_types::{
	current_timestamp, AuctionBid, CancelParams, CrosschainTransferParams,
	TransactionPreparedEvent, MAX_EXPIRY_BUFFER, MAX_SLIPPAGE_TOLERANCE, MIN_EXPIRY_BUFFER,
	MIN_SLIPPAGE_TOLERANCE,
};

/// Parses and bounds-checks a slippage tolerance string.
pub fn parse_slippage_tolerance(value: &str) -> Result<Decimal, SdkError> {
	let slippage = Decimal::from_str(value).map_err(|_| SdkError::InvalidSlippage)?;
	let min = Decimal::from_str(MIN_SLIPPAGE_TOLERANCE).expect("constant parses");
	let max = Decimal::from_str(MAX_SLIPPAGE_TOLERANCE).expect("constant parses");
	if slippage < min || slippage > max {
		return Err(SdkError::InvalidSlippage);
	}
	Ok(slippage)
}

/// Checks an expiry against the allowed window around now.
pub fn validate_expiry(expiry: u64, now: u64) -> Result<(), SdkError> {
	if expiry < now + MIN_EXPIRY_BUFFER.as_secs() || expiry > now + MAX_EXPIRY_BUFFER.as_secs() {
		return Err(SdkError::InvalidExpiry);
	}
	Ok(())
}

/// Validates a quote request.
pub fn validate_transfer_params(params: &CrosschainTransferParams) -> Result<(), SdkError> {
	if params.sending_chain_id == params.receiving_chain_id {
		return Err(SdkError::invalid_params(
			"receivingChainId",
			"sending and receiving chain must differ",
		));
	}
	if params.amount.is_zero() {
		return Err(SdkError::invalid_params("amount", "amount must be positive"));
	}
	parse_slippage_tolerance(&params.slippage_tolerance)?;
	if let Some(expiry) = params.expiry {
		validate_expiry(expiry, current_timestamp())?;
	}
	if let Some(call_data) = &params.call_data {
		let stripped = call_data
			.strip_prefix("0x")
			.ok_or_else(|| SdkError::invalid_params("callData", "missing 0x prefix"))?;
		if hex::decode(stripped).is_err() {
			return Err(SdkError::invalid_params("callData", "not valid hex"));
		}
	}
	Ok(())
}

/// Validates a bid's structure before it is turned into a prepare call.
pub fn validate_auction_bid(bid: &AuctionBid) -> Result<(), SdkError> {
	if bid.sending_chain_id == bid.receiving_chain_id {
		return Err(SdkError::invalid_params(
			"bid.receivingChainId",
			"sending and receiving chain must differ",
		));
	}
	if bid.amount.is_zero() {
		return Err(SdkError::invalid_params(
			"bid.amount",
			"amount must be positive",
		));
	}
	if bid.amount_received.is_zero() {
		return Err(SdkError::invalid_params(
			"bid.amountReceived",
			"amount received must be positive",
		));
	}
	if bid.transaction_id == B256::ZERO {
		return Err(SdkError::invalid_params(
			"bid.transactionId",
			"transaction id must be set",
		));
	}
	if bid.bid_expiry <= current_timestamp() {
		return Err(SdkError::invalid_params(
			"bid.bidExpiry",
			"bid has expired",
		));
	}
	Ok(())
}

/// Validates a prepared event before fulfilling against it.
pub fn validate_prepared_event(event: &TransactionPreparedEvent) -> Result<(), SdkError> {
	if event.tx_data.invariant.transaction_id == B256::ZERO {
		return Err(SdkError::invalid_params(
			"txData.transactionId",
			"transaction id must be set",
		));
	}
	if event.tx_data.amount.is_zero() {
		return Err(SdkError::invalid_params(
			"txData.amount",
			"amount must be positive",
		));
	}
	if event.tx_data.expiry == 0 {
		return Err(SdkError::invalid_params(
			"txData.expiry",
			"expiry must be set",
		));
	}
	Ok(())
}

/// Validates cancel parameters.
pub fn validate_cancel_params(params: &CancelParams) -> Result<(), SdkError> {
	if params.tx_data.invariant.transaction_id == B256::ZERO {
		return Err(SdkError::invalid_params(
			"txData.transactionId",
			"transaction id must be set",
		));
	}
	Ok(())
}
