//! Tagged redemption branches.
//!
//! A spend's redemption path could be represented as one of six string tags
//! (`"create_commit" | "finalize_commit" | "expire" | "change" | "payout" |
//! "revoke"`) passed alongside loose, branch-specific optional secret
//! arguments. [`RedemptionBranch`] replaces the tag with a sum type so a
//! branch that needs a secret cannot be constructed without one.

use common::Secret32;

/// Which redemption path a spend of a deposit or commit script takes.
///
/// Deposit scripts support `CreateCommit`, `FinalizeCommit`, `Change`, and
/// `Expire`. Commit scripts support `Payout` and `Revoke`.
pub enum RedemptionBranch {
    /// Payer-only intermediate spend of the deposit that creates a new
    /// commit output (half-signed; the payee co-signs later).
    CreateCommit,
    /// Payee's 2-of-2 cooperative finalization of the highest active commit,
    /// used by `close_channel`.
    FinalizeCommit,
    /// Payer's absolute-timelocked recovery of an unclaimed deposit.
    Expire,
    /// Payer's recovery of a deposit's change once the payee has revealed
    /// the spend secret via some commit's payout.
    Change { spend_secret: Secret32 },
    /// Payee's claim of a commit after its relative delay has elapsed.
    Payout { spend_secret: Secret32 },
    /// Payer's punishment-spend of a commit the payee has already revoked.
    Revoke { revoke_secret: Secret32 },
}

impl RedemptionBranch {
    /// The branch tag as used by the asset node / script toolkit wire
    /// protocol.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateCommit => "create_commit",
            Self::FinalizeCommit => "finalize_commit",
            Self::Expire => "expire",
            Self::Change { .. } => "change",
            Self::Payout { .. } => "payout",
            Self::Revoke { .. } => "revoke",
        }
    }

    /// Whether this branch spends a deposit script (as opposed to a commit
    /// script).
    pub fn spends_deposit(&self) -> bool {
        matches!(
            self,
            Self::CreateCommit
                | Self::FinalizeCommit
                | Self::Expire
                | Self::Change { .. }
        )
    }
}
