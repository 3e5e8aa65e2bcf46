//! Injected configuration: the asset-node URL, credentials, and bitcoin-node
//! RPC endpoint are not baked in here, but this is the struct an embedder
//! fills in and threads through to the collaborator implementations that do
//! hold those values.

use common::Network;
use serde::{Deserialize, Serialize};

/// The three prefunding spends the deposit reserves base-coin for: a future
/// commit, a payout-or-revoke, and a change-or-expire.
pub const DEPOSIT_PREFUND_MULTIPLE: u64 = 3;

/// Parameters the embedder supplies when constructing a
/// [`crate::controller::ChannelController`]: the asset identifier, network
/// selector, a fixed transaction fee, and a dust threshold.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// The Counterparty-style asset identifier this channel transfers.
    pub asset: String,
    /// Mainnet or testnet.
    pub network: Network,
    /// The fixed per-transaction base-coin fee. Fee-market estimation is out
    /// of scope; the fee is taken as input.
    pub fee_sat: u64,
    /// The dust threshold used for carried base-coin outputs.
    pub dust_sat: u64,
    /// How long the broadcast retry loop waits before giving up.
    pub broadcast_deadline_secs: u64,
}

impl ChannelConfig {
    /// Base-coin reserved at deposit time to prefund up to three future
    /// spends.
    pub fn deposit_prefund_sat(&self) -> u64 {
        (self.fee_sat + self.dust_sat) * DEPOSIT_PREFUND_MULTIPLE
    }

    /// Base-coin a commit carries to fund its own eventual spend, when it
    /// doesn't consume the entire deposit quantity.
    pub fn commit_carry_sat(&self) -> u64 {
        self.fee_sat + self.dust_sat
    }
}

#[cfg(test)]
impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            asset: "TESTASSET".to_owned(),
            network: Network::Testnet,
            fee_sat: 10_000,
            dust_sat: 5_430,
            broadcast_deadline_secs: 3600,
        }
    }
}
