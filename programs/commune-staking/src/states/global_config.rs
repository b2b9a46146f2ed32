use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Global Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the global configuration account.
pub const GLOBAL_CONFIG_SEED: &str = "global_config";

/// Cap on the two-month tier bonus, in percent.
pub const MAX_TIER_TWO_BONUS: u16 = 100;

/// Cap on the three-month tier bonus, in percent.
pub const MAX_TIER_THREE_BONUS: u16 = 200;

/// Stores all protocol-wide configuration parameters and fixed addresses.
///
/// This account is created once at initialization (`InitialiseConfigs`) and is
/// referenced by nearly all instructions. It holds both **static addresses**
/// (mints, vaults, the period ledger) and **tunable parameters** (tier
/// bonuses, wind-down state).
#[account]
#[derive(Default, Debug)]
pub struct GlobalConfig {
    /// PDA bump for this account (for seed derivation).
    pub bump: u8,

    /// Current admin of the protocol (authorized to update config).
    pub admin: Pubkey,

    /// Canonical CMN mint staked by holders and paying the reward stream.
    pub stake_mint: Pubkey,

    /// External settlement-asset mint paying the dividend stream.
    pub dividend_mint: Pubkey,

    /// Program-owned vault holding staked principal and reward surplus.
    pub stake_vault: Pubkey,

    /// Program-owned vault holding dividend-asset deposits.
    pub dividend_vault: Pubkey,

    /// Account holding aggregate staking totals and stream reserves.
    pub staking_state: Pubkey,

    /// Append-only distribution-period ledger account.
    pub period_ledger: Pubkey,

    /// Account whose token accounts receive the custody sweep at wind-down.
    pub sweep_destination: Pubkey,

    /// Reward-weight bonus for two-month stakes, percent, capped at 100.
    pub tier_two_bonus_percent: u16,

    /// Reward-weight bonus for three-month stakes, percent, capped at 200.
    pub tier_three_bonus_percent: u16,

    /// Whether wind-down mode is active (maturity requirements waived).
    pub wind_down_active: bool,

    /// Unix timestamp wind-down was activated at; 0 when inactive.
    pub wind_down_activated_at: u64,
}

impl GlobalConfig {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 8: eight Pubkeys
    /// - 2 * 2: two `u16` fields
    /// - 1: wind-down flag
    /// - 8: wind-down timestamp
    pub const LEN: usize = 8 + 1 + 32 * 8 + 2 * 2 + 1 + 8;
}
