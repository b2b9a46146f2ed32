use anchor_lang::prelude::*;

use crate::{LOCK_DAYS_PER_TIER_MONTH, SECONDS_PER_DAY};

//
// ──────────────────────────────────────────────────────────────────────────────
// StakerAccount Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive each holder's staker account.
pub const STAKER_ACCOUNT_SEED: &str = "staker_account";

/// Maximum number of simultaneous stake records per holder.
pub const MAX_STAKES_PER_HOLDER: usize = 24;

/// A single stake held by a holder.
///
/// The record carries its own settlement cursors: `dividend_checkpoint` and
/// `reward_checkpoint` are the index of the first distribution period the
/// record has *not* yet absorbed, one per stream. They only ever advance.
/// `pondered_amount` is frozen at the last settlement-triggering event and is
/// the exact weight the record contributed to every period created since.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq)]
pub struct StakeRecord {
    /// Raw staked amount. A whole multiple of `BASE_UNIT`.
    pub principal: u64,

    /// Lock duration in months: 1, 2 or 3.
    pub duration_tier: u8,

    /// Unix timestamp the current lock started at.
    pub start_timestamp: u64,

    /// Unix timestamp of the last restake; 0 if never restaked.
    pub last_restake_timestamp: u64,

    /// Frozen weighted amount used by the reward stream.
    pub pondered_amount: u128,

    /// Index of the first period not yet settled into `accrued_dividends`.
    pub dividend_checkpoint: u64,

    /// Index of the first period not yet settled into `accrued_rewards`.
    pub reward_checkpoint: u64,

    /// Dividend-asset earnings computed and locked in, not yet withdrawn.
    pub accrued_dividends: u64,

    /// Stake-asset earnings computed and locked in, not yet withdrawn.
    pub accrued_rewards: u64,

    /// Cumulative earnings ever paid out of this record, both streams.
    pub withdrawn_total: u64,
}

impl StakeRecord {
    /// Serialized size: 8 * 8 `u64` fields + one `u8` + one `u128`.
    pub const LEN: usize = 8 * 8 + 1 + 16;

    /// Seconds the principal stays locked for the chosen tier.
    pub fn lock_seconds(&self) -> u64 {
        self.duration_tier as u64 * LOCK_DAYS_PER_TIER_MONTH * SECONDS_PER_DAY
    }

    /// Whether the lock has elapsed at `now`.
    pub fn is_matured(&self, now: u64) -> bool {
        now.saturating_sub(self.start_timestamp) >= self.lock_seconds()
    }
}

/// Per-holder collection of stake records plus the holder's eligibility bonus.
///
/// Derived from `STAKER_ACCOUNT_SEED + holder_pubkey` and created lazily on
/// first stake. Records are index-addressed; removal swap-compacts, so
/// indices are not stable across an unstake.
#[account]
#[derive(Default, Debug)]
pub struct StakerAccount {
    /// PDA bump for this account.
    pub bump: u8,

    /// Holder this collection belongs to.
    pub owner: Pubkey,

    /// Administrator-set eligibility bonus, in percent. Applies to the
    /// reward-stream weight of every record at its next re-freeze.
    pub social_bonus_percent: u16,

    /// Live stake records, at most `MAX_STAKES_PER_HOLDER`.
    pub stakes: Vec<StakeRecord>,
}

impl StakerAccount {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32: owner pubkey
    /// - 2: social bonus
    /// - 4 + N * record: vec length prefix plus full capacity
    pub const LEN: usize = 8 + 1 + 32 + 2 + 4 + MAX_STAKES_PER_HOLDER * StakeRecord::LEN;

    /// Sum of live principal across all records.
    pub fn total_principal(&self) -> u64 {
        self.stakes.iter().map(|s| s.principal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturity_tracks_tier() {
        let record = StakeRecord {
            principal: 1,
            duration_tier: 2,
            start_timestamp: 1_000,
            ..Default::default()
        };
        let lock = 2 * 30 * SECONDS_PER_DAY;
        assert!(!record.is_matured(1_000));
        assert!(!record.is_matured(1_000 + lock - 1));
        assert!(record.is_matured(1_000 + lock));
        assert!(record.is_matured(1_000 + lock + SECONDS_PER_DAY));
    }

    #[test]
    fn record_len_matches_serialized_size() {
        let record = StakeRecord::default();
        let bytes = record.try_to_vec().unwrap();
        assert_eq!(bytes.len(), StakeRecord::LEN);
    }
}
