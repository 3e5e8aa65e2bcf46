//! The off-chain payment channel state machine for a Counterparty-style
//! micropayment hub: the deposit/commit lifecycle, commit ordering and
//! revocation, the four recovery paths (payout, revoke-punish, change,
//! expire), and validation of counterparty-supplied transactions and
//! scripts.
//!
//! The [`controller::ChannelController`] is the single entry point; it is
//! generic over four collaborator traits ([`traits::AssetNodeClient`],
//! [`traits::ChainClient`], [`traits::ScriptToolkit`], [`traits::KeyToolkit`])
//! so this crate never talks to a real asset node, chain node, or signing
//! library directly.

pub mod branch;
pub mod broadcaster;
pub mod config;
pub mod error;
pub mod state;
pub mod traits;

mod controller;
#[cfg(test)]
mod test_support;

pub use branch::RedemptionBranch;
pub use config::ChannelConfig;
pub use controller::ChannelController;
pub use error::{ChannelError, ChannelResult};
pub use state::{ChannelState, Commit, PayeeKeys, PayerKeys, RevokedCommit, Role};
pub use traits::{AssetNodeClient, ChainClient, KeyToolkit, ScriptToolkit, TxInfo, UnpackedSend, Utxo};
