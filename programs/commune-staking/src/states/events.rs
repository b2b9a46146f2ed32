use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track protocol state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the global configuration is initialized.
///
/// Captures all critical addresses and tunable parameters at genesis so
/// indexers/frontends can cache protocol settings without re-reading accounts.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct GlobalConfigInitialized {
    /// Protocol admin pubkey (may later be updated).
    pub admin: Pubkey,
    /// Canonical CMN mint.
    pub stake_mint: Pubkey,
    /// External settlement-asset mint.
    pub dividend_mint: Pubkey,
    /// Principal/reward custody vault.
    pub stake_vault: Pubkey,
    /// Dividend custody vault.
    pub dividend_vault: Pubkey,
    /// Aggregate staking state account.
    pub staking_state: Pubkey,
    /// Distribution-period ledger account.
    pub period_ledger: Pubkey,
    /// Two-month tier bonus in percent.
    pub tier_two_bonus_percent: u16,
    /// Three-month tier bonus in percent.
    pub tier_three_bonus_percent: u16,
}

/// Emitted whenever configuration parameters are modified via `update_config`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ConfigUpdated {
    /// Current admin (may be the same or newly set).
    pub admin: Pubkey,
    /// Two-month tier bonus in percent after the update.
    pub tier_two_bonus_percent: u16,
    /// Three-month tier bonus in percent after the update.
    pub tier_three_bonus_percent: u16,
    /// Sweep destination after the update.
    pub sweep_destination: Pubkey,
}

/// Emitted when a holder locks new principal.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Staked {
    /// The staking holder.
    pub holder: Pubkey,
    /// Raw principal locked.
    pub amount: u64,
    /// Chosen lock tier in months.
    pub duration_tier: u8,
    /// Frozen reward-stream weight of the new record.
    pub pondered_amount: u128,
}

/// Emitted when a matured stake is rolled into a fresh lock.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Restaked {
    /// The restaking holder.
    pub holder: Pubkey,
    /// Storage slot of the restaked record.
    pub stake_index: u16,
    /// New lock tier in months.
    pub new_tier: u8,
    /// Re-frozen reward-stream weight.
    pub pondered_amount: u128,
}

/// Emitted when a stake exits the pool.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Unstaked {
    /// The exiting holder.
    pub holder: Pubkey,
    /// Principal returned.
    pub principal: u64,
    /// Dividend-asset earnings paid alongside the principal.
    pub dividends_paid: u64,
    /// Stake-asset earnings paid alongside the principal.
    pub rewards_paid: u64,
}

/// Emitted when a holder withdraws accrued earnings without unstaking.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct EarningsWithdrawn {
    /// The withdrawing holder.
    pub holder: Pubkey,
    /// Dividend-asset amount paid.
    pub dividends_paid: u64,
    /// Stake-asset amount paid.
    pub rewards_paid: u64,
}

/// Emitted when a new distribution period freezes the current surpluses.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PeriodCreated {
    /// Dense index of the new period.
    pub index: u64,
    /// Dividend-asset amount the period distributes.
    pub new_dividend_amount: u64,
    /// Stake-asset amount the period distributes.
    pub new_reward_amount: u64,
    /// Total raw principal at creation.
    pub total_stake_at_creation: u64,
    /// Total pondered stake at creation.
    pub total_pondered_stake_at_creation: u128,
}

/// Emitted when stake-asset rewards are deposited through the program.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsDeposited {
    /// The depositing account.
    pub from: Pubkey,
    /// Raw amount moved into the stake vault.
    pub amount: u64,
}

/// Emitted when dividend-asset value is deposited through the program.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct DividendsDeposited {
    /// The depositing account.
    pub from: Pubkey,
    /// Raw amount moved into the dividend vault.
    pub amount: u64,
}

/// Emitted when the admin changes a holder's eligibility bonus.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct SocialBonusUpdated {
    /// The holder whose bonus changed.
    pub holder: Pubkey,
    /// New bonus in percent.
    pub percent: u16,
}

/// Emitted when wind-down mode is switched on.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct WindDownActivated {
    /// Activation timestamp the cooling-off period counts from.
    pub activated_at: u64,
}

/// Emitted when wind-down mode is cancelled before the sweep.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct WindDownCanceled {
    /// Cancellation timestamp.
    pub canceled_at: u64,
}

/// Emitted after the post-cooling-off custody sweep.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct CustodySwept {
    /// Account whose token accounts received both balances.
    pub destination: Pubkey,
    /// Stake-asset amount swept.
    pub stake_amount: u64,
    /// Dividend-asset amount swept.
    pub dividend_amount: u64,
}
