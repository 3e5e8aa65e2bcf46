//! The channel controller's error taxonomy.
//!
//! Validation and counterparty-misbehavior errors are recoverable by the
//! caller (the RPC front-end returns them to the remote party) and never
//! leave the controller's state mutated. Protocol errors are fatal and
//! propagate out of the controller unchanged.

use thiserror::Error;

/// Errors produced by [`crate::controller::ChannelController`] operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    // --- Input validation --- //
    #[error("invalid WIF key")]
    InvalidKey,

    #[error("invalid public key")]
    InvalidPubkey,

    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("invalid relative sequence: {0}")]
    InvalidSequence(u32),

    #[error("invalid quantity {quantity}: must exceed transferred amount and not exceed deposit total {total}")]
    InvalidQuantity { quantity: u64, total: u64 },

    // --- Balance --- //
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    // --- Channel reuse --- //
    #[error("deposit address {address} already has {tx_count} on-chain transaction(s)")]
    ChannelAlreadyUsed { address: String, tx_count: usize },

    // --- Counterparty misbehavior --- //
    #[error("spend secret hash mismatch: expected {expected}, got {actual}")]
    SpendSecretHashMismatch { expected: String, actual: String },

    #[error("payee pubkey mismatch: expected {expected}, got {actual}")]
    PayeePubkeyMismatch { expected: String, actual: String },

    #[error("payer pubkey mismatch: expected {expected}, got {actual}")]
    PayerPubkeyMismatch { expected: String, actual: String },

    #[error("deposit/commit binding mismatch: {0}")]
    DepositBindingMismatch(String),

    #[error("bad signature count: expected {expected}, got {actual}")]
    BadSignatureCount { expected: u32, actual: u32 },

    #[error("script shape invalid: {0}")]
    InvalidScriptShape(String),

    // --- Channel lifecycle --- //
    #[error("no active commits")]
    NoActiveCommits,

    #[error("channel has not been set up (call setup/deposit first)")]
    ChannelNotOpen,

    #[error("operation requires the {0} role")]
    WrongRole(&'static str),

    // --- Protocol / transport (fatal; not recovered inside the controller) --- //
    #[error("asset node protocol error: {0}")]
    Protocol(String),

    #[error("transport error: {0:#}")]
    Transport(#[from] anyhow::Error),

    // --- Internal invariant failure --- //
    #[error("internal invariant violated: {0}")]
    Assertion(String),
}

impl ChannelError {
    /// Whether this error is one the caller can recover from (it leaves
    /// state unmutated and should be returned to the remote counterparty),
    /// as opposed to a protocol/transport error that's fatal to the calling
    /// context.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ChannelError::Protocol(_)
                | ChannelError::Transport(_)
                | ChannelError::Assertion(_)
        )
    }
}

pub type ChannelResult<T> = Result<T, ChannelError>;
