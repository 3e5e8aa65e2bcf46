//! Broadcast-and-retry.
//!
//! A raw tx is submitted, then the loop polls until the chain reports at
//! least one confirmation, retrying on a fixed interval (`common::backoff`).
//! The loop is bounded by a [`Deadline`] so it can't spin forever.

use bitcoin::consensus::encode::deserialize;
use bitcoin::Transaction;
use common::{backoff, Deadline};
use tracing::{info, warn};

use crate::error::{ChannelError, ChannelResult};
use crate::traits::ChainClient;

/// Compute a raw transaction's txid without any network access. Used for
/// dry-run callers that want to short-circuit before broadcasting.
pub fn compute_txid(rawtx: &[u8]) -> ChannelResult<String> {
    let tx: Transaction = deserialize(rawtx).map_err(|e| {
        ChannelError::Assertion(format!("malformed raw transaction: {e}"))
    })?;
    Ok(tx.txid().to_string())
}

/// Broadcast `rawtx` and retry every [`backoff::REBROADCAST_INTERVAL`] until
/// the chain client reports at least one confirmation or `deadline` elapses.
///
/// Returns the txid on success. If `dry_run` is set, returns the computed
/// txid immediately without broadcasting.
pub async fn publish_and_confirm(
    chain: &dyn ChainClient,
    rawtx: &[u8],
    deadline: Deadline,
    dry_run: bool,
) -> ChannelResult<String> {
    let txid = compute_txid(rawtx)?;
    if dry_run {
        return Ok(txid);
    }

    for wait in backoff::get_rebroadcast_iter() {
        if chain.confirms(&txid).await?.is_some() {
            return Ok(txid);
        }

        match chain.broadcast(rawtx).await {
            Ok(()) => {
                info!(%txid, "broadcast transaction");
            }
            Err(e) => warn!(%txid, "publishing failed: {e:#}"),
        }

        if chain.confirms(&txid).await?.is_some() {
            return Ok(txid);
        }

        if deadline.has_elapsed() {
            return Err(ChannelError::Transport(anyhow::anyhow!(
                "gave up broadcasting {txid} after deadline elapsed"
            )));
        }

        tokio::time::sleep(wait.min(deadline.remaining())).await;

        if deadline.has_elapsed() {
            return Err(ChannelError::Transport(anyhow::anyhow!(
                "gave up broadcasting {txid} after deadline elapsed"
            )));
        }
    }

    unreachable!("get_rebroadcast_iter is infinite")
}
