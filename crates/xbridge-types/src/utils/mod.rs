//! Utility functions shared across the SDK.
//!
//! This module groups the canonical bid encoding and signature recovery,
//! string formatting helpers, amount math, and the protocol constants.

pub mod constants;
pub mod encoding;
pub mod formatting;
pub mod helpers;
pub mod math;

pub use constants::{
	AUCTION_TIMEOUT, DEFAULT_EXPIRY_BUFFER, DEFAULT_POLL_INTERVAL, DEFAULT_SLIPPAGE_TOLERANCE,
	DEFAULT_SUBGRAPH_SYNC_BUFFER, FULFILL_GAS_LIMIT, MAX_EXPIRY_BUFFER, MAX_SLIPPAGE_TOLERANCE,
	META_TX_TIMEOUT, MIN_EXPIRY_BUFFER, MIN_SLIPPAGE_TOLERANCE, ROUTER_FEE_BPS,
};
pub use encoding::{
	decode_auction_bid, encode_auction_bid, fulfill_hash_to_sign, hash_auction_bid,
	recover_bid_signer, recover_fulfill_signer, EncodingError,
};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
pub use math::{calculate_exchange_amount, get_receiver_amount};
