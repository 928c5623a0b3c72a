//! Amount math with integer floor semantics.
//!
//! All on-chain amounts are integers; exchange-rate multiplications round
//! toward zero so the SDK never over-promises what a router must deliver.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::constants::ROUTER_FEE_BPS;

/// Multiplies an amount by a decimal rate, taking the integer portion of
/// the result.
///
/// Negative rates clamp to zero; rates in this SDK live in `(0, 1]`.
pub fn calculate_exchange_amount(amount: U256, rate: Decimal) -> U256 {
	if rate.is_sign_negative() || rate.is_zero() {
		return U256::ZERO;
	}
	let numerator = U256::from(rate.mantissa().unsigned_abs());
	let denominator = U256::from(10u64).pow(U256::from(rate.scale()));
	amount * numerator / denominator
}

/// The amount a user can expect on the receiving chain for a given sending
/// amount, after the router fee.
pub fn get_receiver_amount(amount: U256) -> U256 {
	amount * U256::from(10_000 - ROUTER_FEE_BPS) / U256::from(10_000u64)
}
