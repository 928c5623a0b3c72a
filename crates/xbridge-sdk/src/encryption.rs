//! Wallet-side callData encryption boundary.
//!
//! A transfer carrying callData must encrypt it to the user's wallet key
//! so only the user can decrypt and fulfill. Key retrieval and the cipher
//! live with the wallet, not the SDK; implementations of [`Encrypter`] are
//! injected at construction.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use thiserror::Error;

/// Failure inside the wallet encryption channel.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EncryptionFailure(pub String);

/// Trait for the wallet encryption channel.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait Encrypter: Send + Sync {
	/// Fetches the user's encryption public key and encrypts the calldata
	/// to it.
	async fn encrypt(&self, user: Address, call_data: &Bytes)
		-> Result<Bytes, EncryptionFailure>;
}
