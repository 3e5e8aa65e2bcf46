//! The channel state record and its role-asymmetric representation: a common
//! chain-derived core shared by both sides, plus a role-specific tail
//! (payer-only vs payee-only key material) rather than a pair of nullable
//! fields that are never both set.

use common::Secret32;
use secrecy::Secret;

use crate::error::{ChannelError, ChannelResult};

/// The payer-only key material.
#[derive(Clone)]
pub struct PayerKeys {
    pub wif: Secret<String>,
}

/// The payee-only key material: the WIF plus the `spend_secret` whose
/// `hash160` is embedded in every script under this deposit.
#[derive(Clone)]
pub struct PayeeKeys {
    pub wif: Secret<String>,
    pub spend_secret: Secret32,
}

/// Which side of the channel this controller instance is. Exactly one of
/// the two variants' key material exists for the lifetime of a channel; the
/// side is fixed at setup and never changes.
#[derive(Clone)]
pub enum Role {
    Payer(PayerKeys),
    Payee(PayeeKeys),
}

impl Role {
    pub fn wif(&self) -> &Secret<String> {
        match self {
            Role::Payer(k) => &k.wif,
            Role::Payee(k) => &k.wif,
        }
    }

    pub fn is_payer(&self) -> bool {
        matches!(self, Role::Payer(_))
    }

    pub fn is_payee(&self) -> bool {
        matches!(self, Role::Payee(_))
    }

    pub fn spend_secret(&self) -> Option<&Secret32> {
        match self {
            Role::Payer(_) => None,
            Role::Payee(k) => Some(&k.spend_secret),
        }
    }
}

/// A non-revoked commit. `quantity` is the asset quantity this commit
/// assigns to the payee, cached at the point the commit was appended rather
/// than re-derived via an `AssetNodeClient::quantity_of` round trip on every
/// ordering pass — the async collaborator interface makes a round trip
/// awkward inside a `Vec::sort_by_key` comparator. The value is always the
/// one `quantity_of` returned when the commit was created/accepted (see
/// DESIGN.md).
#[derive(Clone)]
pub struct Commit {
    pub rawtx: Vec<u8>,
    pub script: Vec<u8>,
    pub quantity: u64,
    pub revoke_secret: Option<Secret32>,
}

/// A retired commit: the revoke secret is now known and this side will use
/// it to punish a stale broadcast.
#[derive(Clone)]
pub struct RevokedCommit {
    pub rawtx: Vec<u8>,
    pub script: Vec<u8>,
    pub quantity: u64,
    pub revoke_secret: Secret32,
}

/// The full channel state record.
#[derive(Clone, Default)]
pub struct ChannelState {
    pub role: Option<Role>,
    pub deposit_script: Vec<u8>,
    pub deposit_rawtx: Vec<u8>,
    pub commits_requested: Vec<Secret32>,
    pub commits_active: Vec<Commit>,
    pub commits_revoked: Vec<RevokedCommit>,
    pub expire_rawtxs: Vec<Vec<u8>>,
    pub change_rawtxs: Vec<Vec<u8>>,
    pub revoke_rawtxs: Vec<Vec<u8>>,
    pub payout_rawtxs: Vec<Vec<u8>>,
}

impl ChannelState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Restore the `commits_active` sort invariant: callers must keep this
    /// list sorted by quantity before any append or read that depends on
    /// order.
    pub fn order_active(&mut self) {
        self.commits_active.sort_by_key(|c| c.quantity);
    }

    /// 0 if no active commits, else the quantity embedded in the highest
    /// `commits_active` entry.
    pub fn transferred_amount(&mut self) -> u64 {
        self.order_active();
        self.commits_active.last().map(|c| c.quantity).unwrap_or(0)
    }

    /// Require the payer role, or fail.
    pub fn require_payer(&self) -> ChannelResult<&PayerKeys> {
        match &self.role {
            Some(Role::Payer(k)) => Ok(k),
            Some(Role::Payee(_)) => Err(ChannelError::WrongRole("payer")),
            None => Err(ChannelError::ChannelNotOpen),
        }
    }

    /// Require the payee role, or fail.
    pub fn require_payee(&self) -> ChannelResult<&PayeeKeys> {
        match &self.role {
            Some(Role::Payee(k)) => Ok(k),
            Some(Role::Payer(_)) => Err(ChannelError::WrongRole("payee")),
            None => Err(ChannelError::ChannelNotOpen),
        }
    }

    /// Move the active commit whose script's revoke hash matches `secret`
    /// into `commits_revoked`, filling in its revoke secret. This is the
    /// fine-grained primitive behind `revoke_until`. Unknown secrets are
    /// silently skipped.
    pub fn revoke_one(
        &mut self,
        secret: &Secret32,
        revoke_hash_of: impl Fn(&[u8]) -> [u8; 20],
        hash160: impl Fn(&[u8]) -> [u8; 20],
    ) -> Option<()> {
        let secret_hash = hash160(secret.expose_bytes());
        let idx = self
            .commits_active
            .iter()
            .position(|c| revoke_hash_of(&c.script) == secret_hash)?;
        let commit = self.commits_active.remove(idx);
        self.commits_revoked.push(RevokedCommit {
            rawtx: commit.rawtx,
            script: commit.script,
            quantity: commit.quantity,
            revoke_secret: secret.clone(),
        });
        Some(())
    }

    /// Every raw tx in `payout_rawtxs + revoke_rawtxs + change_rawtxs +
    /// expire_rawtxs` whose inputs spend `commit_txid`.
    pub fn is_commit_spent(
        &self,
        commit_txid: &str,
        input_prevouts: impl Fn(&[u8]) -> Vec<String>,
    ) -> bool {
        self.payout_rawtxs
            .iter()
            .chain(self.revoke_rawtxs.iter())
            .chain(self.change_rawtxs.iter())
            .chain(self.expire_rawtxs.iter())
            .any(|rawtx| {
                input_prevouts(rawtx)
                    .iter()
                    .any(|prev| prev == commit_txid)
            })
    }
}
