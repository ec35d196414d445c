//! Simulated wallet transfers
//!
//! Crypto donations are confirmed with a transaction hash. No transaction is
//! broadcast: the hash is random and only the request shape is checked.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Request to move funds to a charity wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Recipient address (`0x`-prefixed)
    pub to: String,
    /// Amount in the chain's native unit
    pub amount: Decimal,
    /// Optional memo carried with the transfer
    #[serde(default)]
    pub data: String,
}

/// Outcome of a simulated transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// `0x` followed by 64 lowercase hex digits
    pub tx_hash: String,
}

/// Wallet that fabricates transaction hashes
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWallet;

impl SimulatedWallet {
    /// Create wallet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// "Send" a transfer and return its receipt
    ///
    /// # Errors
    /// - `ValidationError::InvalidAddress` if `to` is not `0x`-prefixed
    /// - `ValidationError::NonPositiveAmount` if `amount <= 0`
    pub fn send(&self, request: &TransferRequest) -> Result<TransactionReceipt, ValidationError> {
        let address = request.to.trim();
        if address.len() <= 2 || !address.starts_with("0x") {
            return Err(ValidationError::InvalidAddress(request.to.clone()));
        }
        if request.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        let bytes: [u8; 32] = rand::random();
        let tx_hash = format!("0x{}", hex::encode(bytes));
        tracing::info!(
            to = %address,
            amount = %request.amount,
            memo_len = request.data.len(),
            "Simulated wallet transfer: {}",
            tx_hash
        );
        Ok(TransactionReceipt { tx_hash })
    }
}
