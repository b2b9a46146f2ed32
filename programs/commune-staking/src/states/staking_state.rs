use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakingState Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the global staking state account.
pub const STAKING_STATE_SEED: &str = "staking_state";

/// Aggregate totals and stream reserves for the entire protocol.
///
/// This account tracks:
/// - Global staking totals (raw and pondered).
/// - Per-stream reserves separating distributed-but-unpaid value from fresh
///   vault surplus.
/// - Cumulative distribution and payout tallies for auditability.
///
/// Each holder has their own `StakerAccount` for individual accounting, but
/// all surplus detection and period snapshots derive from this account.
#[account]
#[derive(Default, Debug)]
pub struct StakingState {
    /// PDA bump for this account.
    pub bump: u8,

    /// Sum of all live stake records' raw principal.
    pub total_stake: u64,

    /// Sum of all live stake records' frozen pondered amounts.
    pub total_pondered_stake: u128,

    /// Principal currently held in the stake vault on behalf of stakers.
    /// Anything in the vault beyond this and `pending_rewards` is fresh
    /// reward-stream surplus.
    pub total_owned_principal: u64,

    /// Stake-asset value already allocated to periods but not yet paid out.
    pub pending_rewards: u64,

    /// Dividend-asset value already allocated to periods but not yet paid out.
    pub pending_dividends: u64,

    /// Cumulative dividend-asset value ever allocated to periods.
    pub total_dividends_distributed: u64,

    /// Cumulative stake-asset value ever allocated to periods.
    pub total_rewards_distributed: u64,

    /// Cumulative dividend-asset value ever paid to holders.
    pub total_dividends_paid: u64,

    /// Cumulative stake-asset value ever paid to holders.
    pub total_rewards_paid: u64,

    /// Last UNIX timestamp (seconds) when any update was made to this account.
    pub last_update_timestamp: u64,
}

impl StakingState {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8 * 9: nine `u64` fields
    /// - 16: one `u128` field
    pub const LEN: usize = 8 + 1 + 8 * 9 + 16;

    /// Fresh stake-asset surplus sitting in the vault: everything beyond
    /// owned principal and already-allocated rewards.
    pub fn reward_surplus(&self, stake_vault_amount: u64) -> u64 {
        stake_vault_amount
            .saturating_sub(self.total_owned_principal)
            .saturating_sub(self.pending_rewards)
    }

    /// Fresh dividend-asset surplus sitting in the vault.
    pub fn dividend_surplus(&self, dividend_vault_amount: u64) -> u64 {
        dividend_vault_amount.saturating_sub(self.pending_dividends)
    }

    /// Whether a new distribution period may be created right now.
    pub fn can_create_period(&self, stake_vault_amount: u64, dividend_vault_amount: u64) -> bool {
        self.total_stake > 0
            && (self.reward_surplus(stake_vault_amount) > 0
                || self.dividend_surplus(dividend_vault_amount) > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surplus_excludes_principal_and_reserves() {
        let state = StakingState {
            total_stake: 500,
            total_owned_principal: 500,
            pending_rewards: 70,
            pending_dividends: 30,
            ..Default::default()
        };
        assert_eq!(state.reward_surplus(570), 0);
        assert_eq!(state.reward_surplus(600), 30);
        assert_eq!(state.dividend_surplus(30), 0);
        assert_eq!(state.dividend_surplus(45), 15);
    }

    #[test]
    fn no_period_without_stakers_or_surplus() {
        let mut state = StakingState {
            total_stake: 0,
            ..Default::default()
        };
        assert!(!state.can_create_period(1_000, 1_000));
        state.total_stake = 100;
        state.total_owned_principal = 100;
        assert!(!state.can_create_period(100, 0));
        assert!(state.can_create_period(101, 0));
        assert!(state.can_create_period(100, 1));
    }
}
