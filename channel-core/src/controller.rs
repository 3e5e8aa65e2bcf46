//! The channel controller: the single long-lived object that serializes
//! every mutation behind one lock and drives the deposit/commit lifecycle
//! plus the four recovery paths.
//!
//! A thin owner of collaborator handles plus one `tokio::sync::Mutex` around
//! the mutable record, with every public method taking the lock for its
//! entire duration, including the network calls it makes while holding it.

use std::sync::Arc;
use std::time::Duration;

use common::rng::SysRng;
use common::{Deadline, Secret32};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::Mutex;
use tracing::info;

use crate::branch::RedemptionBranch;
use crate::broadcaster;
use crate::config::ChannelConfig;
use crate::error::{ChannelError, ChannelResult};
use crate::state::{ChannelState, Commit, PayeeKeys, PayerKeys, Role};
use crate::traits::{AssetNodeClient, ChainClient, KeyToolkit, ScriptToolkit};

/// A BIP-68-style relative sequence must be nonzero and fit the 16-bit
/// block-count form: timelocks are unsigned integers counted in block
/// confirmations.
fn validate_sequence(seq: u32) -> ChannelResult<()> {
    if seq == 0 || seq > 0xFFFF {
        return Err(ChannelError::InvalidSequence(seq));
    }
    Ok(())
}

/// The channel controller. Parameterized by [`ChannelConfig`] and the four
/// collaborator traits; owns the mutable [`ChannelState`] behind a single
/// lock.
pub struct ChannelController {
    config: ChannelConfig,
    asset_node: Arc<dyn AssetNodeClient>,
    chain: Arc<dyn ChainClient>,
    script: Arc<dyn ScriptToolkit>,
    key: Arc<dyn KeyToolkit>,
    rng: Mutex<SysRng>,
    state: Mutex<ChannelState>,
}

impl ChannelController {
    pub fn new(
        config: ChannelConfig,
        asset_node: Arc<dyn AssetNodeClient>,
        chain: Arc<dyn ChainClient>,
        script: Arc<dyn ScriptToolkit>,
        key: Arc<dyn KeyToolkit>,
    ) -> Self {
        Self {
            config,
            asset_node,
            chain,
            script,
            key,
            rng: Mutex::new(SysRng::new()),
            state: Mutex::new(ChannelState::empty()),
        }
    }

    fn broadcast_deadline(&self) -> Deadline {
        Deadline::after(Duration::from_secs(self.config.broadcast_deadline_secs))
    }

    fn input_prevouts(&self, rawtx: &[u8]) -> Vec<String> {
        bitcoin::consensus::deserialize::<bitcoin::Transaction>(rawtx)
            .map(|tx| {
                tx.input
                    .iter()
                    .map(|input| input.previous_output.txid.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Revoke every secret in `secrets` against `state` directly, without
    /// re-acquiring the lock. `revoke_until` logically calls `revoke_all`
    /// reentrantly; here the caller already holds the only guard (see
    /// DESIGN.md for the reentrant-lock resolution).
    fn revoke_all_locked(&self, state: &mut ChannelState, secrets: &[Secret32]) {
        for secret in secrets {
            state.revoke_one(
                secret,
                |script| self.script.commit_revoke_secret_hash(script).unwrap_or([0xff; 20]),
                |data| self.key.hash160(data),
            );
        }
    }

    /// Confirm `rawtx` actually funds `script`: its asset-transfer
    /// destination must be the address `script` derives to, and it must
    /// carry a non-zero quantity of the configured asset. Returns that
    /// quantity. A counterparty could otherwise hand over a well-formed but
    /// unrelated transaction alongside a valid-looking script.
    async fn verify_rawtx_funds_script(
        &self,
        rawtx: &[u8],
        script: &[u8],
    ) -> ChannelResult<u64> {
        let expected_address = self.script.script_address(script, self.config.network)?;
        let info = self.asset_node.get_tx_info(rawtx).await?;
        if info.destination != expected_address {
            return Err(ChannelError::DepositBindingMismatch(format!(
                "tx pays {}, expected script address {expected_address}",
                info.destination
            )));
        }

        let quantity = self.asset_node.quantity_of(rawtx, &self.config.asset).await?;
        if quantity == 0 {
            return Err(ChannelError::DepositBindingMismatch(
                "tx carries zero quantity of the configured asset".to_owned(),
            ));
        }
        Ok(quantity)
    }

    /// Scan every known commit's address for a transaction beyond the commit
    /// itself that reveals the payee's spend secret. First hit wins.
    async fn find_spend_secret(
        &self,
        state: &ChannelState,
    ) -> ChannelResult<Option<Secret32>> {
        let commits: Vec<(&[u8], &[u8])> = state
            .commits_active
            .iter()
            .map(|c| (c.script.as_slice(), c.rawtx.as_slice()))
            .chain(
                state
                    .commits_revoked
                    .iter()
                    .map(|c| (c.script.as_slice(), c.rawtx.as_slice())),
            )
            .collect();

        for (script, own_rawtx) in commits {
            let own_txid = broadcaster::compute_txid(own_rawtx)?;
            let address = self.script.script_address(script, self.config.network)?;
            let txids = self.chain.get_transactions(&address).await?;
            for txid in txids {
                if txid == own_txid {
                    continue;
                }
                let rawtx = self.chain.retrieve_tx(&txid).await?;
                if let Some(secret) = self.script.get_spend_secret(&rawtx, script)? {
                    return Ok(Some(secret));
                }
            }
        }
        Ok(None)
    }

    // ----------------------------------------------------------------- //
    // Payer-side operations
    // ----------------------------------------------------------------- //

    /// Open a new channel by funding a fresh deposit script.
    pub async fn deposit(
        &self,
        payer_wif: Secret<String>,
        payee_pubkey: &[u8],
        spend_secret_hash: [u8; 20],
        expire_time: u32,
        quantity: u64,
    ) -> ChannelResult<(Vec<u8>, Vec<u8>)> {
        if quantity == 0 {
            return Err(ChannelError::InvalidQuantity { quantity, total: 0 });
        }
        validate_sequence(expire_time)?;

        let payer_pubkey = self.key.wif_to_pubkey(payer_wif.expose_secret())?;
        let payer_address =
            self.key.wif_to_address(payer_wif.expose_secret(), self.config.network)?;

        let deposit_script = self.script.compile_deposit_script(
            &payer_pubkey,
            payee_pubkey,
            &spend_secret_hash,
            expire_time,
        )?;
        let deposit_address =
            self.script.script_address(&deposit_script, self.config.network)?;

        let prior_txs = self.chain.get_transactions(&deposit_address).await?;
        if !prior_txs.is_empty() {
            return Err(ChannelError::ChannelAlreadyUsed {
                address: deposit_address,
                tx_count: prior_txs.len(),
            });
        }

        let asset_balance =
            self.asset_node.get_balance(&payer_address, &self.config.asset).await?;
        if asset_balance < quantity {
            return Err(ChannelError::InsufficientFunds {
                required: quantity,
                available: asset_balance,
            });
        }

        let prefund_sat = self.config.deposit_prefund_sat();
        let base_balance: u64 = self
            .chain
            .retrieve_utxos(std::slice::from_ref(&payer_address))
            .await?
            .iter()
            .map(|utxo| utxo.value_sat)
            .sum();
        if base_balance < prefund_sat {
            return Err(ChannelError::InsufficientFunds {
                required: prefund_sat,
                available: base_balance,
            });
        }

        let unsigned = self
            .asset_node
            .create_send(
                &payer_address,
                &deposit_address,
                quantity,
                &self.config.asset,
                prefund_sat,
                self.config.fee_sat,
            )
            .await?;
        let signed = self
            .chain
            .sign_tx(&unsigned, std::slice::from_ref(payer_wif.expose_secret()))
            .await?;

        broadcaster::publish_and_confirm(
            self.chain.as_ref(),
            &signed,
            self.broadcast_deadline(),
            false,
        )
        .await?;

        let mut state = self.state.lock().await;
        *state = ChannelState::empty();
        state.role = Some(Role::Payer(PayerKeys { wif: payer_wif }));
        state.deposit_script = deposit_script.clone();
        state.deposit_rawtx = signed.clone();

        info!(address = %deposit_address, quantity, "opened deposit");
        Ok((signed, deposit_script))
    }

    /// Create a new commit transferring `quantity` of the deposit to the
    /// payee, hash-locked to `revoke_secret_hash` and delayed by
    /// `delay_time`.
    pub async fn create_commit(
        &self,
        quantity: u64,
        revoke_secret_hash: [u8; 20],
        delay_time: u32,
    ) -> ChannelResult<(Vec<u8>, Vec<u8>)> {
        validate_sequence(delay_time)?;

        let mut state = self.state.lock().await;
        let payer = state.require_payer()?.clone();

        let total =
            self.asset_node.quantity_of(&state.deposit_rawtx, &self.config.asset).await?;
        let transferred = state.transferred_amount();
        if quantity <= transferred || quantity > total {
            return Err(ChannelError::InvalidQuantity { quantity, total });
        }

        let payer_pubkey = self.script.deposit_payer_pubkey(&state.deposit_script)?;
        let payee_pubkey = self.script.deposit_payee_pubkey(&state.deposit_script)?;
        let spend_secret_hash =
            self.script.deposit_spend_secret_hash(&state.deposit_script)?;

        let commit_script = self.script.compile_commit_script(
            &payer_pubkey,
            &payee_pubkey,
            &spend_secret_hash,
            &revoke_secret_hash,
            delay_time,
        )?;
        let deposit_address =
            self.script.script_address(&state.deposit_script, self.config.network)?;
        let commit_address = self.script.script_address(&commit_script, self.config.network)?;

        // No change is needed when the commit spends the full deposit
        // quantity: all remaining base coin becomes fee/carry.
        let carry_sat = if quantity == total { 0 } else { self.config.commit_carry_sat() };

        let unsigned = self
            .asset_node
            .create_send(
                &deposit_address,
                &commit_address,
                quantity,
                &self.config.asset,
                carry_sat,
                self.config.fee_sat,
            )
            .await?;

        let signed = self.script.sign_spend(
            &unsigned,
            &state.deposit_script,
            payer.wif.expose_secret(),
            &RedemptionBranch::CreateCommit,
        )?;

        state.commits_active.push(Commit {
            rawtx: signed.clone(),
            script: commit_script.clone(),
            quantity,
            revoke_secret: None,
        });
        state.order_active();

        info!(quantity, "created commit");
        Ok((signed, commit_script))
    }

    /// The payer's idempotent reconciliation step: revoke-punish stale
    /// commits, recover change once the spend secret leaks, and recover an
    /// unclaimed deposit past its expire time.
    pub async fn payer_update(&self) -> ChannelResult<()> {
        let mut state = self.state.lock().await;
        let payer = state.require_payer()?.clone();
        let deadline = self.broadcast_deadline();

        let revoked = state.commits_revoked.clone();
        for commit in &revoked {
            let txid = broadcaster::compute_txid(&commit.rawtx)?;
            if state.is_commit_spent(&txid, |rawtx| self.input_prevouts(rawtx)) {
                continue;
            }

            let address = self.script.script_address(&commit.script, self.config.network)?;
            let balance = self.asset_node.get_balance(&address, &self.config.asset).await?;
            if !self.chain.is_spendable_address(&address, balance > 0).await? {
                continue;
            }

            let payer_address =
                self.key.wif_to_address(payer.wif.expose_secret(), self.config.network)?;
            let unsigned = self
                .asset_node
                .create_send(
                    &address,
                    &payer_address,
                    commit.quantity,
                    &self.config.asset,
                    0,
                    self.config.fee_sat,
                )
                .await?;
            let signed = self.script.sign_spend(
                &unsigned,
                &commit.script,
                payer.wif.expose_secret(),
                &RedemptionBranch::Revoke { revoke_secret: commit.revoke_secret.clone() },
            )?;
            broadcaster::publish_and_confirm(self.chain.as_ref(), &signed, deadline, false)
                .await?;
            state.revoke_rawtxs.push(signed);
            info!(quantity = commit.quantity, "broadcast revoke-punish transaction");
        }

        if !state.deposit_rawtx.is_empty() {
            let deposit_txid = broadcaster::compute_txid(&state.deposit_rawtx)?;
            let already_spent =
                state.is_commit_spent(&deposit_txid, |rawtx| self.input_prevouts(rawtx));

            if !already_spent {
                let deposit_address =
                    self.script.script_address(&state.deposit_script, self.config.network)?;
                let balance =
                    self.asset_node.get_balance(&deposit_address, &self.config.asset).await?;
                let spendable = balance > 0
                    && self.chain.is_spendable_address(&deposit_address, balance > 0).await?;

                if spendable {
                    if let Some(spend_secret) = self.find_spend_secret(&state).await? {
                        let payer_address = self
                            .key
                            .wif_to_address(payer.wif.expose_secret(), self.config.network)?;
                        let unsigned = self
                            .asset_node
                            .create_send(
                                &deposit_address,
                                &payer_address,
                                balance,
                                &self.config.asset,
                                0,
                                self.config.fee_sat,
                            )
                            .await?;
                        let signed = self.script.sign_spend(
                            &unsigned,
                            &state.deposit_script,
                            payer.wif.expose_secret(),
                            &RedemptionBranch::Change { spend_secret },
                        )?;
                        broadcaster::publish_and_confirm(
                            self.chain.as_ref(),
                            &signed,
                            deadline,
                            false,
                        )
                        .await?;
                        state.change_rawtxs.push(signed);
                        info!("broadcast change-recover transaction");
                    }
                }

                let expire_time = self.script.deposit_expire_time(&state.deposit_script)?;
                let confirms = self.chain.confirms(&deposit_txid).await?.unwrap_or(0);
                if spendable && confirms >= expire_time as u64 {
                    let payer_address = self
                        .key
                        .wif_to_address(payer.wif.expose_secret(), self.config.network)?;
                    let unsigned = self
                        .asset_node
                        .create_send(
                            &deposit_address,
                            &payer_address,
                            balance,
                            &self.config.asset,
                            0,
                            self.config.fee_sat,
                        )
                        .await?;
                    let signed = self.script.sign_spend(
                        &unsigned,
                        &state.deposit_script,
                        payer.wif.expose_secret(),
                        &RedemptionBranch::Expire,
                    )?;
                    broadcaster::publish_and_confirm(
                        self.chain.as_ref(),
                        &signed,
                        deadline,
                        false,
                    )
                    .await?;
                    state.expire_rawtxs.push(signed);
                    info!("broadcast expire-recover transaction");
                }
            }
        }

        Ok(())
    }

    // ----------------------------------------------------------------- //
    // Payee-side operations
    // ----------------------------------------------------------------- //

    /// Set up a fresh channel on the payee side: generate the spend secret
    /// and pubkey the payer will bind into the deposit script.
    pub async fn setup(&self, payee_wif: Secret<String>) -> ChannelResult<(Vec<u8>, [u8; 20])> {
        let payee_pubkey = self.key.wif_to_pubkey(payee_wif.expose_secret())?;

        let spend_secret = {
            let mut rng = self.rng.lock().await;
            Secret32::from_rng(&mut *rng)
        };
        let spend_secret_hash = self.key.hash160(spend_secret.expose_bytes());

        let mut state = self.state.lock().await;
        *state = ChannelState::empty();
        state.role = Some(Role::Payee(PayeeKeys { wif: payee_wif, spend_secret }));

        info!("payee set up fresh channel");
        Ok((payee_pubkey, spend_secret_hash))
    }

    /// Validate and record the payer's deposit on the payee side.
    pub async fn set_deposit(&self, rawtx: Vec<u8>, script: Vec<u8>) -> ChannelResult<()> {
        let mut state = self.state.lock().await;
        let payee = state.require_payee()?.clone();

        let bad_sigs = self.script.bad_signature_count(&rawtx)?;
        if bad_sigs != 1 {
            return Err(ChannelError::BadSignatureCount { expected: 1, actual: bad_sigs });
        }

        let shape_ok = self.script.deposit_payer_pubkey(&script).is_ok()
            && self.script.deposit_payee_pubkey(&script).is_ok()
            && self.script.deposit_spend_secret_hash(&script).is_ok()
            && self.script.deposit_expire_time(&script).is_ok();
        if !shape_ok {
            return Err(ChannelError::InvalidScriptShape(
                "deposit script fields did not parse".to_owned(),
            ));
        }

        let expected_hash = self.key.hash160(payee.spend_secret.expose_bytes());
        let actual_hash = self.script.deposit_spend_secret_hash(&script)?;
        if actual_hash != expected_hash {
            return Err(ChannelError::SpendSecretHashMismatch {
                expected: common::hex::encode(&expected_hash),
                actual: common::hex::encode(&actual_hash),
            });
        }

        let expected_pubkey = self.key.wif_to_pubkey(payee.wif.expose_secret())?;
        let actual_pubkey = self.script.deposit_payee_pubkey(&script)?;
        if actual_pubkey != expected_pubkey {
            return Err(ChannelError::PayeePubkeyMismatch {
                expected: common::hex::encode(&expected_pubkey),
                actual: common::hex::encode(&actual_pubkey),
            });
        }

        self.verify_rawtx_funds_script(&rawtx, &script).await?;

        state.deposit_rawtx = rawtx;
        state.deposit_script = script;
        info!("recorded payer deposit");
        Ok(())
    }

    /// Request a new commit for `quantity`, generating a fresh revoke
    /// secret the payer will hash-lock the commit script to.
    pub async fn request_commit(&self, quantity: u64) -> ChannelResult<(u64, [u8; 20])> {
        let mut state = self.state.lock().await;
        state.require_payee()?;

        let total =
            self.asset_node.quantity_of(&state.deposit_rawtx, &self.config.asset).await?;
        let transferred = state.transferred_amount();
        if quantity <= transferred || quantity > total {
            return Err(ChannelError::InvalidQuantity { quantity, total });
        }

        let revoke_secret = {
            let mut rng = self.rng.lock().await;
            Secret32::from_rng(&mut *rng)
        };
        let revoke_secret_hash = self.key.hash160(revoke_secret.expose_bytes());
        state.commits_requested.push(revoke_secret);

        info!(quantity, "requested commit");
        Ok((quantity, revoke_secret_hash))
    }

    /// Validate and record a payer-issued commit on the payee side, matching
    /// it against a previously requested revoke secret.
    pub async fn set_commit(
        &self,
        rawtx: Vec<u8>,
        script: Vec<u8>,
    ) -> ChannelResult<Option<u64>> {
        let mut state = self.state.lock().await;
        let payee = state.require_payee()?.clone();

        let bad_sigs = self.script.bad_signature_count(&rawtx)?;
        if bad_sigs != 1 {
            return Err(ChannelError::BadSignatureCount { expected: 1, actual: bad_sigs });
        }

        let shape_ok = self.script.commit_payee_pubkey(&script).is_ok()
            && self.script.commit_spend_secret_hash(&script).is_ok()
            && self.script.commit_revoke_secret_hash(&script).is_ok()
            && self.script.commit_delay_time(&script).is_ok();
        if !shape_ok {
            return Err(ChannelError::InvalidScriptShape(
                "commit script fields did not parse".to_owned(),
            ));
        }

        let expected_spend_hash = self.key.hash160(payee.spend_secret.expose_bytes());
        let actual_spend_hash = self.script.commit_spend_secret_hash(&script)?;
        if actual_spend_hash != expected_spend_hash {
            return Err(ChannelError::SpendSecretHashMismatch {
                expected: common::hex::encode(&expected_spend_hash),
                actual: common::hex::encode(&actual_spend_hash),
            });
        }

        let expected_pubkey = self.key.wif_to_pubkey(payee.wif.expose_secret())?;
        let actual_pubkey = self.script.commit_payee_pubkey(&script)?;
        if actual_pubkey != expected_pubkey {
            return Err(ChannelError::PayeePubkeyMismatch {
                expected: common::hex::encode(&expected_pubkey),
                actual: common::hex::encode(&actual_pubkey),
            });
        }

        let revoke_hash = self.script.commit_revoke_secret_hash(&script)?;
        let idx = state
            .commits_requested
            .iter()
            .position(|secret| self.key.hash160(secret.expose_bytes()) == revoke_hash);
        let Some(idx) = idx else {
            return Ok(None);
        };
        let revoke_secret = state.commits_requested.remove(idx);

        let quantity = self.verify_rawtx_funds_script(&rawtx, &script).await?;
        state.commits_active.push(Commit {
            rawtx,
            script,
            quantity,
            revoke_secret: Some(revoke_secret),
        });
        state.order_active();

        let transferred = state.transferred_amount();
        info!(transferred, "recorded payer commit");
        Ok(Some(transferred))
    }

    /// Revoke every active commit whose quantity exceeds `quantity`,
    /// highest first, returning the revoke secrets handed over.
    pub async fn revoke_until(&self, quantity: u64) -> ChannelResult<Vec<Secret32>> {
        let mut state = self.state.lock().await;
        state.require_payee()?;

        let mut above_cutoff: Vec<(u64, Secret32)> = state
            .commits_active
            .iter()
            .filter(|c| c.quantity > quantity)
            .filter_map(|c| c.revoke_secret.clone().map(|secret| (c.quantity, secret)))
            .collect();
        above_cutoff.sort_by(|a, b| b.0.cmp(&a.0));
        let secrets: Vec<Secret32> = above_cutoff.into_iter().map(|(_, s)| s).collect();

        self.revoke_all_locked(&mut state, &secrets);

        info!(count = secrets.len(), "revoked commits above cutoff");
        Ok(secrets)
    }

    /// Revoke every commit whose script matches one of `secrets`.
    pub async fn revoke_all(&self, secrets: Vec<Secret32>) -> ChannelResult<()> {
        let mut state = self.state.lock().await;
        state.require_payee()?;
        self.revoke_all_locked(&mut state, &secrets);
        Ok(())
    }

    /// Cooperatively finalize the highest active commit and broadcast it,
    /// closing the channel.
    pub async fn close_channel(&self) -> ChannelResult<String> {
        let mut state = self.state.lock().await;
        let payee = state.require_payee()?.clone();

        state.order_active();
        let commit = state.commits_active.last().cloned().ok_or(ChannelError::NoActiveCommits)?;

        let signed = self.script.sign_spend(
            &commit.rawtx,
            &state.deposit_script,
            payee.wif.expose_secret(),
            &RedemptionBranch::FinalizeCommit,
        )?;

        let txid = broadcaster::publish_and_confirm(
            self.chain.as_ref(),
            &signed,
            self.broadcast_deadline(),
            false,
        )
        .await?;

        if let Some(last) = state.commits_active.last_mut() {
            last.rawtx = signed;
        }

        info!(%txid, "closed channel via cooperative finalize");
        Ok(txid)
    }

    /// The payee's idempotent reconciliation step: broadcast a payout for
    /// every commit whose relative delay has elapsed and hasn't already
    /// been spent.
    pub async fn payee_update(&self) -> ChannelResult<()> {
        let mut state = self.state.lock().await;
        let payee = state.require_payee()?.clone();
        let deadline = self.broadcast_deadline();

        let candidates: Vec<Commit> = state
            .commits_active
            .iter()
            .cloned()
            .chain(state.commits_revoked.iter().map(|c| Commit {
                rawtx: c.rawtx.clone(),
                script: c.script.clone(),
                quantity: c.quantity,
                revoke_secret: Some(c.revoke_secret.clone()),
            }))
            .collect();

        for commit in candidates {
            let txid = broadcaster::compute_txid(&commit.rawtx)?;
            if state.is_commit_spent(&txid, |rawtx| self.input_prevouts(rawtx)) {
                continue;
            }

            let address = self.script.script_address(&commit.script, self.config.network)?;
            let balance = self.asset_node.get_balance(&address, &self.config.asset).await?;
            if !self.chain.is_spendable_address(&address, balance > 0).await? {
                continue;
            }

            let confirms = self.chain.confirms(&txid).await?.unwrap_or(0);
            let delay_time = self.script.commit_delay_time(&commit.script)?;
            if confirms < delay_time as u64 {
                continue;
            }

            let payee_address =
                self.key.wif_to_address(payee.wif.expose_secret(), self.config.network)?;
            let unsigned = self
                .asset_node
                .create_send(
                    &address,
                    &payee_address,
                    commit.quantity,
                    &self.config.asset,
                    0,
                    self.config.fee_sat,
                )
                .await?;
            let signed = self.script.sign_spend(
                &unsigned,
                &commit.script,
                payee.wif.expose_secret(),
                &RedemptionBranch::Payout { spend_secret: payee.spend_secret.clone() },
            )?;
            broadcaster::publish_and_confirm(self.chain.as_ref(), &signed, deadline, false)
                .await?;
            state.payout_rawtxs.push(signed);
            info!(quantity = commit.quantity, "broadcast payout transaction");
        }

        Ok(())
    }

    // ----------------------------------------------------------------- //
    // Shared queries
    // ----------------------------------------------------------------- //

    /// The highest quantity any active commit has assigned to the payee.
    pub async fn get_transferred_amount(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.transferred_amount()
    }

    /// Whether the deposit has at least `min_confirms` confirmations and a
    /// non-zero balance.
    pub async fn is_deposit_confirmed(&self, min_confirms: u64) -> ChannelResult<bool> {
        let state = self.state.lock().await;
        if state.deposit_rawtx.is_empty() {
            return Ok(false);
        }
        let address = self.script.script_address(&state.deposit_script, self.config.network)?;
        let balance = self.asset_node.get_balance(&address, &self.config.asset).await?;
        if balance == 0 {
            return Ok(false);
        }
        let txid = broadcaster::compute_txid(&state.deposit_rawtx)?;
        let confirms = self.chain.confirms(&txid).await?.unwrap_or(0);
        Ok(confirms >= min_confirms)
    }

    async fn rawtxs_all_confirmed(
        &self,
        rawtxs: &[Vec<u8>],
        min_confirms: u64,
    ) -> ChannelResult<bool> {
        if rawtxs.is_empty() {
            return Ok(false);
        }
        for rawtx in rawtxs {
            let txid = broadcaster::compute_txid(rawtx)?;
            let confirms = self.chain.confirms(&txid).await?.unwrap_or(0);
            if confirms < min_confirms {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether every broadcast payout has at least `min_confirms`
    /// confirmations.
    pub async fn payout_confirmed(&self, min_confirms: u64) -> ChannelResult<bool> {
        let state = self.state.lock().await;
        self.rawtxs_all_confirmed(&state.payout_rawtxs, min_confirms).await
    }

    /// Whether every broadcast change-recovery has at least `min_confirms`
    /// confirmations.
    pub async fn change_confirmed(&self, min_confirms: u64) -> ChannelResult<bool> {
        let state = self.state.lock().await;
        self.rawtxs_all_confirmed(&state.change_rawtxs, min_confirms).await
    }

    /// Normalize `commits_active` ordering, then return a deep copy of the
    /// state for persistence.
    pub async fn save(&self) -> ChannelState {
        let mut state = self.state.lock().await;
        state.order_active();
        state.clone()
    }

    /// Restore a previously saved state.
    pub async fn load(&self, saved: ChannelState) {
        let mut state = self.state.lock().await;
        *state = saved;
    }

    /// Discard all state, resetting the controller as if never set up.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        *state = ChannelState::empty();
    }
}
