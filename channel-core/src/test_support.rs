//! Hand-written mock collaborators for scenario tests: deterministic,
//! in-memory stand-ins for the asset node, chain client, and key/script
//! toolkits so controller tests don't need a real Bitcoin/asset-node stack.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::{OutPoint, PackedLockTime, Script, Sequence, Transaction, TxIn, TxOut, Witness};
use common::Secret32;

use crate::error::{ChannelError, ChannelResult};
use crate::traits::{
    AssetNodeClient, ChainClient, KeyToolkit, ScriptToolkit, TxInfo, UnpackedSend, Utxo,
};

/// A minimal, deserializable raw transaction with one input and one output,
/// for tests that only need a well-formed txid to key off of.
pub fn sample_rawtx() -> Vec<u8> {
    tx_spending(OutPoint::null())
}

/// A well-formed raw transaction whose single input spends `prevout`.
pub fn tx_spending(prevout: OutPoint) -> Vec<u8> {
    let tx = Transaction {
        version: 2,
        lock_time: PackedLockTime::ZERO,
        input: vec![TxIn {
            previous_output: prevout,
            script_sig: Script::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output: vec![TxOut { value: 1_000, script_pubkey: Script::new() }],
    };
    bitcoin::consensus::encode::serialize(&tx)
}

#[derive(Default)]
struct MockChainState {
    confirms: HashMap<String, Option<u64>>,
    pending_confirm_after: Option<(String, u32)>,
    broadcast_count: u32,
    transactions: HashMap<String, Vec<String>>,
    rawtxs: HashMap<String, Vec<u8>>,
}

/// A [`ChainClient`] double whose confirmation state is set up directly by
/// tests rather than by simulating a real chain.
#[derive(Default)]
pub struct MockChainClient {
    inner: Mutex<MockChainState>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_confirms(&self, txid: &str, confirms: Option<u64>) {
        self.inner.lock().unwrap().confirms.insert(txid.to_owned(), confirms);
    }

    pub fn set_transactions(&self, address: &str, txids: Vec<String>) {
        self.inner.lock().unwrap().transactions.insert(address.to_owned(), txids);
    }

    pub fn put_rawtx(&self, txid: &str, rawtx: Vec<u8>) {
        self.inner.lock().unwrap().rawtxs.insert(txid.to_owned(), rawtx);
    }

    /// Arrange for `txid` to report a confirmation only once it has been
    /// broadcast at least `n` times.
    pub fn confirm_after_n_broadcasts(&self, txid: &str, n: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.confirms.insert(txid.to_owned(), None);
        inner.pending_confirm_after = Some((txid.to_owned(), n));
    }

    pub fn broadcast_count(&self) -> u32 {
        self.inner.lock().unwrap().broadcast_count
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_transactions(&self, address: &str) -> ChannelResult<Vec<String>> {
        Ok(self.inner.lock().unwrap().transactions.get(address).cloned().unwrap_or_default())
    }

    async fn confirms(&self, txid: &str) -> ChannelResult<Option<u64>> {
        Ok(self.inner.lock().unwrap().confirms.get(txid).copied().unwrap_or(None))
    }

    async fn retrieve_utxos(&self, _addresses: &[String]) -> ChannelResult<Vec<Utxo>> {
        Ok(vec![])
    }

    async fn retrieve_tx(&self, txid: &str) -> ChannelResult<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .rawtxs
            .get(txid)
            .cloned()
            .ok_or_else(|| ChannelError::Transport(anyhow::anyhow!("unknown txid {txid}")))
    }

    async fn sign_tx(&self, rawtx: &[u8], _wifs: &[String]) -> ChannelResult<Vec<u8>> {
        Ok(rawtx.to_vec())
    }

    async fn broadcast(&self, rawtx: &[u8]) -> ChannelResult<()> {
        let txid = crate::broadcaster::compute_txid(rawtx)?;
        let mut inner = self.inner.lock().unwrap();
        inner.broadcast_count += 1;
        inner.rawtxs.insert(txid.clone(), rawtx.to_vec());
        if let Some((pending_txid, n)) = inner.pending_confirm_after.clone() {
            if pending_txid == txid && inner.broadcast_count >= n {
                inner.confirms.insert(txid, Some(1));
            }
        }
        Ok(())
    }
}

/// An [`AssetNodeClient`] double returning caller-supplied balances and
/// quantities instead of talking to a real asset node.
#[derive(Default)]
pub struct MockAssetNode {
    balances: Mutex<HashMap<String, u64>>,
    quantities: Mutex<HashMap<Vec<u8>, u64>>,
    destinations: Mutex<HashMap<Vec<u8>, String>>,
    next_send_prevout: Mutex<Option<OutPoint>>,
}

impl MockAssetNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, address: &str, asset_quantity: u64) {
        self.balances.lock().unwrap().insert(address.to_owned(), asset_quantity);
    }

    pub fn set_quantity(&self, rawtx: &[u8], quantity: u64) {
        self.quantities.lock().unwrap().insert(rawtx.to_vec(), quantity);
    }

    /// Arrange for `get_tx_info(rawtx)` to report `address` as the
    /// transaction's destination, as if it actually paid a script there.
    pub fn set_destination(&self, rawtx: &[u8], address: &str) {
        self.destinations.lock().unwrap().insert(rawtx.to_vec(), address.to_owned());
    }

    /// Make the next `create_send` build a transaction whose single input
    /// spends `prevout`, instead of the default null outpoint. Consumed by
    /// that one call; tests use this to make a recovery spend's computed
    /// txid line up with a specific prior transaction it claims to spend.
    pub fn set_next_send_prevout(&self, prevout: OutPoint) {
        *self.next_send_prevout.lock().unwrap() = Some(prevout);
    }
}

#[async_trait]
impl AssetNodeClient for MockAssetNode {
    async fn create_send(
        &self,
        _source_address: &str,
        _dest_address: &str,
        _quantity: u64,
        _asset: &str,
        _regular_dust_size: u64,
        _fee: u64,
    ) -> ChannelResult<Vec<u8>> {
        let prevout = self.next_send_prevout.lock().unwrap().take().unwrap_or_else(OutPoint::null);
        Ok(tx_spending(prevout))
    }

    async fn get_balance(&self, address: &str, _asset: &str) -> ChannelResult<u64> {
        Ok(self.balances.lock().unwrap().get(address).copied().unwrap_or(0))
    }

    async fn get_tx_info(&self, rawtx: &[u8]) -> ChannelResult<TxInfo> {
        let destination =
            self.destinations.lock().unwrap().get(rawtx).cloned().unwrap_or_default();
        Ok(TxInfo {
            source: String::new(),
            destination,
            btc_amount_sat: 0,
            fee_sat: 0,
            data: vec![],
        })
    }

    async fn unpack(&self, _data: &[u8]) -> ChannelResult<UnpackedSend> {
        Ok(UnpackedSend { message_type_id: 0, asset: "TESTASSET".to_owned(), quantity: 0 })
    }

    async fn quantity_of(&self, rawtx: &[u8], _expected_asset: &str) -> ChannelResult<u64> {
        Ok(self.quantities.lock().unwrap().get(rawtx).copied().unwrap_or(0))
    }
}

/// A [`KeyToolkit`] double: deterministic, not cryptographically meaningful.
#[derive(Default)]
pub struct MockKeyToolkit;

#[async_trait::async_trait]
impl KeyToolkit for MockKeyToolkit {
    fn wif_to_pubkey(&self, wif: &str) -> ChannelResult<Vec<u8>> {
        Ok(format!("pub:{wif}").into_bytes())
    }

    fn wif_to_address(&self, wif: &str, network: common::Network) -> ChannelResult<String> {
        Ok(format!("addr:{network}:{wif}"))
    }

    fn hash160(&self, data: &[u8]) -> [u8; 20] {
        let mut out = [0u8; 20];
        for (i, b) in data.iter().enumerate() {
            out[i % 20] ^= *b;
        }
        out
    }
}

/// A [`ScriptToolkit`] double that encodes script fields as a fixed-layout
/// byte blob instead of real Bitcoin Script opcodes, so tests can round-trip
/// fields without a real secp256k1/Script dependency in the test harness.
#[derive(Default)]
pub struct MockScriptToolkit;

const DEPOSIT_TAG: u8 = 0xD0;
const COMMIT_TAG: u8 = 0xC0;

fn push(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(bytes);
}

fn read<'a>(buf: &'a [u8], cursor: &mut usize) -> ChannelResult<&'a [u8]> {
    let len = *buf.get(*cursor).ok_or_else(|| {
        ChannelError::InvalidScriptShape("truncated script".to_owned())
    })? as usize;
    *cursor += 1;
    let field = buf.get(*cursor..*cursor + len).ok_or_else(|| {
        ChannelError::InvalidScriptShape("truncated script field".to_owned())
    })?;
    *cursor += len;
    Ok(field)
}

impl ScriptToolkit for MockScriptToolkit {
    fn compile_deposit_script(
        &self,
        payer_pubkey: &[u8],
        payee_pubkey: &[u8],
        spend_secret_hash: &[u8; 20],
        expire_time: u32,
    ) -> ChannelResult<Vec<u8>> {
        let mut buf = vec![DEPOSIT_TAG];
        push(&mut buf, payer_pubkey);
        push(&mut buf, payee_pubkey);
        push(&mut buf, spend_secret_hash);
        buf.extend_from_slice(&expire_time.to_le_bytes());
        Ok(buf)
    }

    fn compile_commit_script(
        &self,
        payer_pubkey: &[u8],
        payee_pubkey: &[u8],
        spend_secret_hash: &[u8; 20],
        revoke_secret_hash: &[u8; 20],
        delay_time: u32,
    ) -> ChannelResult<Vec<u8>> {
        let mut buf = vec![COMMIT_TAG];
        push(&mut buf, payer_pubkey);
        push(&mut buf, payee_pubkey);
        push(&mut buf, spend_secret_hash);
        push(&mut buf, revoke_secret_hash);
        buf.extend_from_slice(&delay_time.to_le_bytes());
        Ok(buf)
    }

    fn deposit_payer_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>> {
        self.expect_tag(script, DEPOSIT_TAG)?;
        let mut cursor = 1;
        Ok(read(script, &mut cursor)?.to_vec())
    }

    fn deposit_payee_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>> {
        self.expect_tag(script, DEPOSIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        Ok(read(script, &mut cursor)?.to_vec())
    }

    fn deposit_spend_secret_hash(&self, script: &[u8]) -> ChannelResult<[u8; 20]> {
        self.expect_tag(script, DEPOSIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        let hash = read(script, &mut cursor)?;
        hash.try_into().map_err(|_| ChannelError::InvalidHashLength { expected: 20, actual: hash.len() })
    }

    fn deposit_expire_time(&self, script: &[u8]) -> ChannelResult<u32> {
        self.expect_tag(script, DEPOSIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        let tail = script.get(cursor..cursor + 4).ok_or_else(|| {
            ChannelError::InvalidScriptShape("missing expire_time".to_owned())
        })?;
        Ok(u32::from_le_bytes(tail.try_into().unwrap()))
    }

    fn commit_payee_pubkey(&self, script: &[u8]) -> ChannelResult<Vec<u8>> {
        self.expect_tag(script, COMMIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        Ok(read(script, &mut cursor)?.to_vec())
    }

    fn commit_spend_secret_hash(&self, script: &[u8]) -> ChannelResult<[u8; 20]> {
        self.expect_tag(script, COMMIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        let hash = read(script, &mut cursor)?;
        hash.try_into().map_err(|_| ChannelError::InvalidHashLength { expected: 20, actual: hash.len() })
    }

    fn commit_revoke_secret_hash(&self, script: &[u8]) -> ChannelResult<[u8; 20]> {
        self.expect_tag(script, COMMIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        let hash = read(script, &mut cursor)?;
        hash.try_into().map_err(|_| ChannelError::InvalidHashLength { expected: 20, actual: hash.len() })
    }

    fn commit_delay_time(&self, script: &[u8]) -> ChannelResult<u32> {
        self.expect_tag(script, COMMIT_TAG)?;
        let mut cursor = 1;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        read(script, &mut cursor)?;
        let tail = script.get(cursor..cursor + 4).ok_or_else(|| {
            ChannelError::InvalidScriptShape("missing delay_time".to_owned())
        })?;
        Ok(u32::from_le_bytes(tail.try_into().unwrap()))
    }

    fn script_address(&self, script: &[u8], network: common::Network) -> ChannelResult<String> {
        Ok(format!("addr:{network}:{}", common::hex::encode(script)))
    }

    fn sign_spend(
        &self,
        rawtx: &[u8],
        _script: &[u8],
        _wif: &str,
        _branch: &crate::branch::RedemptionBranch,
    ) -> ChannelResult<Vec<u8>> {
        Ok(rawtx.to_vec())
    }

    fn bad_signature_count(&self, _rawtx: &[u8]) -> ChannelResult<u32> {
        Ok(1)
    }

    fn get_spend_secret(
        &self,
        _rawtx: &[u8],
        _commit_script: &[u8],
    ) -> ChannelResult<Option<Secret32>> {
        Ok(None)
    }
}

impl MockScriptToolkit {
    fn expect_tag(&self, script: &[u8], tag: u8) -> ChannelResult<()> {
        if script.first() != Some(&tag) {
            return Err(ChannelError::InvalidScriptShape(format!(
                "expected tag {tag:#x}"
            )));
        }
        Ok(())
    }
}
