//! A simple network selector, analogous to [`bitcoin::Network`] but with a
//! consistent [`FromStr`]/[`Display`] and without being `#[non_exhaustive]`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Mainnet or testnet — the two networks the channel hub operates on.
///
/// Kept distinct from `bitcoin::Network` because the asset-issuing layer
/// this hub runs on only distinguishes the two; regtest/signet are
/// test-harness concerns that don't need a variant here.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn is_testnet(self) -> bool {
        matches!(self, Self::Testnet)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(anyhow::anyhow!("unrecognized network: '{s}'")),
        }
    }
}
