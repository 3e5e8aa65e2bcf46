//! The channel controller's four collaborators.
//!
//! `AssetNodeClient` and `ChainClient` are remote, I/O-bound services and so
//! are modeled as `#[async_trait]`s, the same way this family's collaborator
//! traits for channel managers and persisters are defined. `ScriptToolkit`
//! and `KeyToolkit` are pure functions over key/script material and so are
//! plain synchronous traits.

use async_trait::async_trait;
use common::{Network, Secret32};

use crate::branch::RedemptionBranch;
use crate::error::ChannelResult;

/// A single unspent output, as returned by [`ChainClient::retrieve_utxos`].
#[derive(Clone, Debug)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub value_sat: u64,
}

/// The decoded fields `get_tx_info` returns for a raw asset-transfer tx.
#[derive(Clone, Debug)]
pub struct TxInfo {
    pub source: String,
    pub destination: String,
    pub btc_amount_sat: u64,
    pub fee_sat: u64,
    /// The embedded Counterparty-style message payload, to be fed to
    /// [`AssetNodeClient::unpack`].
    pub data: Vec<u8>,
}

/// The decoded asset-send message `unpack` returns.
#[derive(Clone, Debug)]
pub struct UnpackedSend {
    pub message_type_id: u32,
    pub asset: String,
    pub quantity: u64,
}

/// The asset-issuing node's JSON-RPC surface this controller depends on:
/// composing sends, reading balances, and decoding transfer messages.
#[async_trait]
pub trait AssetNodeClient: Send + Sync {
    /// Compose (but do not sign or broadcast) an asset transfer.
    async fn create_send(
        &self,
        source_address: &str,
        dest_address: &str,
        quantity: u64,
        asset: &str,
        regular_dust_size: u64,
        fee: u64,
    ) -> ChannelResult<Vec<u8>>;

    /// `{quantity}` of `asset` currently held at `address` (0 if none).
    async fn get_balance(
        &self,
        address: &str,
        asset: &str,
    ) -> ChannelResult<u64>;

    async fn get_tx_info(&self, rawtx: &[u8]) -> ChannelResult<TxInfo>;

    async fn unpack(&self, data: &[u8]) -> ChannelResult<UnpackedSend>;

    /// Round-trip a raw asset-transfer tx through `get_tx_info` + `unpack`,
    /// asserting the message type id is an asset send (`0`) and the asset
    /// matches `expected_asset`.
    async fn quantity_of(
        &self,
        rawtx: &[u8],
        expected_asset: &str,
    ) -> ChannelResult<u64> {
        let info = self.get_tx_info(rawtx).await?;
        let unpacked = self.unpack(&info.data).await?;
        if unpacked.message_type_id != 0 {
            return Err(crate::error::ChannelError::Protocol(format!(
                "incorrect message type id: {} != 0",
                unpacked.message_type_id
            )));
        }
        if unpacked.asset != expected_asset {
            return Err(crate::error::ChannelError::Protocol(format!(
                "incorrect asset: {} != {expected_asset}",
                unpacked.asset
            )));
        }
        Ok(unpacked.quantity)
    }
}

/// The underlying chain node's query/broadcast surface.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Txids seen at `address`, most-recent first.
    async fn get_transactions(
        &self,
        address: &str,
    ) -> ChannelResult<Vec<String>>;

    /// Confirmation count for `txid`, or `None` if unseen.
    ///
    /// Callers that compare this count against a commit's `delay_time` or a
    /// deposit's `expire_time` (both BIP-68-style relative sequences) rely
    /// on this count agreeing with what the chain will enforce against the
    /// relative-locktime spend — an implementer swapping in a different
    /// `ChainClient` must verify that equivalence before reusing
    /// [`crate::controller::ChannelController`]'s recovery logic unmodified.
    async fn confirms(&self, txid: &str) -> ChannelResult<Option<u64>>;

    async fn retrieve_utxos(
        &self,
        addresses: &[String],
    ) -> ChannelResult<Vec<Utxo>>;

    async fn retrieve_tx(&self, txid: &str) -> ChannelResult<Vec<u8>>;

    /// Sign `rawtx`'s plain (non-script-path) inputs with `wifs`.
    async fn sign_tx(
        &self,
        rawtx: &[u8],
        wifs: &[String],
    ) -> ChannelResult<Vec<u8>>;

    /// Submit `rawtx` to the network (`sendrawtransaction`).
    async fn broadcast(&self, rawtx: &[u8]) -> ChannelResult<()>;

    /// A txid is spendable-from-address-ready: non-zero balance, and the
    /// most recent on-chain tx at the address has at least one confirmation.
    /// Given as a default so most `ChainClient` impls don't need to
    /// reimplement the policy, but the balance check is delegated to the
    /// caller via `balance_nonzero`.
    async fn is_spendable_address(
        &self,
        address: &str,
        balance_nonzero: bool,
    ) -> ChannelResult<bool> {
        if !balance_nonzero {
            return Ok(false);
        }
        let txids = self.get_transactions(address).await?;
        let Some(latest) = txids.first() else {
            return Ok(false);
        };
        let confirms = self.confirms(latest).await?.unwrap_or(0);
        Ok(confirms > 0)
    }
}

/// Script compilation, field extraction, and signing: pure functions to
/// compile deposit and commit scripts, extract their embedded fields, and
/// sign spends under the various redemption branches.
pub trait ScriptToolkit: Send + Sync {
    /// 2-of-2 + hash-lock + expire-branch deposit script.
    fn compile_deposit_script(
        &self,
        payer_pubkey: &[u8],
        payee_pubkey: &[u8],
        spend_secret_hash: &[u8; 20],
        expire_time: u32,
    ) -> ChannelResult<Vec<u8>>;

    /// Payout/revoke commit script bound to a deposit.
    fn compile_commit_script(
        &self,
        payer_pubkey: &[u8],
        payee_pubkey: &[u8],
        spend_secret_hash: &[u8; 20],
        revoke_secret_hash: &[u8; 20],
        delay_time: u32,
    ) -> ChannelResult<Vec<u8>>;

    fn deposit_payer_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>>;
    fn deposit_payee_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>>;
    fn deposit_spend_secret_hash(
        &self,
        script: &[u8],
    ) -> ChannelResult<[u8; 20]>;
    fn deposit_expire_time(&self, script: &[u8]) -> ChannelResult<u32>;

    fn commit_payee_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>>;
    fn commit_spend_secret_hash(
        &self,
        script: &[u8],
    ) -> ChannelResult<[u8; 20]>;
    fn commit_revoke_secret_hash(
        &self,
        script: &[u8],
    ) -> ChannelResult<[u8; 20]>;
    fn commit_delay_time(&self, script: &[u8]) -> ChannelResult<u32>;

    /// The P2SH address a script pays to, on `network`.
    fn script_address(
        &self,
        script: &[u8],
        network: Network,
    ) -> ChannelResult<String>;

    /// Sign `rawtx`'s spend of `script` under `branch`, using `wif` plus
    /// whatever secret `branch` carries. Returns the (possibly
    /// partially-signed) raw tx.
    fn sign_spend(
        &self,
        rawtx: &[u8],
        script: &[u8],
        wif: &str,
        branch: &RedemptionBranch,
    ) -> ChannelResult<Vec<u8>>;

    /// How many inputs of `rawtx` are still missing a valid signature. A
    /// real implementation must actually check each input's signature, not
    /// just assert a count.
    fn bad_signature_count(&self, rawtx: &[u8]) -> ChannelResult<u32>;

    /// If `rawtx` is a payout-branch spend of `commit_script`, extract the
    /// revealed spend secret from its scriptSig.
    fn get_spend_secret(
        &self,
        rawtx: &[u8],
        commit_script: &[u8],
    ) -> ChannelResult<Option<Secret32>>;
}

/// WIF key handling: converts wallet-import keys to public keys, addresses,
/// and signing scalars; hashes.
pub trait KeyToolkit: Send + Sync {
    fn wif_to_pubkey(&self, wif: &str) -> ChannelResult<Vec<u8>>;
    fn wif_to_address(
        &self,
        wif: &str,
        network: Network,
    ) -> ChannelResult<String>;
    fn hash160(&self, data: &[u8]) -> [u8; 20];
}
