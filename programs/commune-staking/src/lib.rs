use anchor_lang::prelude::*;

declare_id!("45gVbLLSYYcW254TFoJMXmfupM5dJaFxTLsbny2eqKWx");

#[cfg(not(feature = "no-entrypoint"))]
solana_security_txt::security_txt! {
    name: "Commune Staking",
    project_url: "https://commune.finance",
    contacts: "email:security@commune.finance",
    policy: "https://commune.finance/security"
}

pub mod admin {
    use anchor_lang::prelude::declare_id;
    declare_id!("6nTTJwtDuxjv8C1JMsajYQapmPAGrC3QF1w5nu9LXJvt");
}

pub const AUTH_SEED: &str = "staking_authority";
pub const STAKE_VAULT_SEED: &str = "stake_vault";
pub const DIVIDEND_VAULT_SEED: &str = "dividend_vault";

/// One whole CMN token in raw units; staked principal is counted in these.
pub const BASE_UNIT: u64 = 1_000_000_000;

/// Largest principal a single stake record may hold, in base units.
pub const MAX_STAKE_BASE_UNITS: u64 = u32::MAX as u64;

/// Upper bound on (period, stream) contributions a single call may replay.
pub const CATCH_UP_STEP_BUDGET: u64 = 50;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Days of lock per month of the chosen duration tier.
pub const LOCK_DAYS_PER_TIER_MONTH: u64 = 30;

/// Cooling-off delay between wind-down activation and custody sweep.
pub const WIND_DOWN_COOLING_SECONDS: u64 = 120 * SECONDS_PER_DAY;

/// Exact confirmation string required by the wind-down switches.
pub const WIND_DOWN_CONFIRMATION: &str = "DECOMMISSION COMMUNE STAKING";

pub mod accrual;
pub mod error;
pub mod instructions;
pub mod states;
pub mod utils;

use instructions::*;

#[program]
pub mod commune_staking {

    use super::*;

    pub fn initialise_configs(
        ctx: Context<InitialiseConfigs>,
        admin: Pubkey,
        sweep_destination: Pubkey,
        tier_two_bonus_percent: u16,
        tier_three_bonus_percent: u16,
    ) -> Result<()> {
        instructions::initialise_configs(
            ctx,
            admin,
            sweep_destination,
            tier_two_bonus_percent,
            tier_three_bonus_percent,
        )
    }

    pub fn stake(ctx: Context<Stake>, amount: u64, duration_tier: u8) -> Result<()> {
        instructions::stake(ctx, amount, duration_tier)
    }

    pub fn restake(ctx: Context<Restake>, stake_index: u16, new_tier: u8) -> Result<()> {
        instructions::restake(ctx, stake_index, new_tier)
    }

    pub fn unstake(ctx: Context<Unstake>, stake_index: u16) -> Result<()> {
        instructions::unstake(ctx, stake_index)
    }

    pub fn withdraw_dividends_and_rewards(ctx: Context<Withdraw>) -> Result<u64> {
        instructions::withdraw_dividends_and_rewards(ctx)
    }

    pub fn precompute_stake(ctx: Context<Precompute>, stake_index: u16) -> Result<()> {
        instructions::precompute_stake(ctx, stake_index)
    }

    pub fn precompute_all(ctx: Context<Precompute>) -> Result<()> {
        instructions::precompute_all(ctx)
    }

    pub fn compute_dividends(ctx: Context<ComputeEarnings>) -> Result<u64> {
        instructions::compute_dividends(ctx)
    }

    pub fn compute_rewards(ctx: Context<ComputeEarnings>) -> Result<u64> {
        instructions::compute_rewards(ctx)
    }

    pub fn compute_total_earnings(ctx: Context<ComputeEarnings>) -> Result<u64> {
        instructions::compute_total_earnings(ctx)
    }

    pub fn compute_withdrawable(ctx: Context<ComputeEarnings>) -> Result<u64> {
        instructions::compute_withdrawable(ctx)
    }

    pub fn compute_holder_stake(ctx: Context<ComputeEarnings>) -> Result<u64> {
        instructions::compute_holder_stake(ctx)
    }

    pub fn can_create_period(ctx: Context<InspectPeriod>) -> Result<bool> {
        instructions::can_create_period(ctx)
    }

    pub fn create_period(ctx: Context<CreatePeriod>) -> Result<()> {
        instructions::create_period(ctx)
    }

    pub fn deposit_rewards(ctx: Context<DepositRewards>, amount: u64) -> Result<()> {
        instructions::deposit_rewards(ctx, amount)
    }

    pub fn deposit_dividends(ctx: Context<DepositDividends>, amount: u64) -> Result<()> {
        instructions::deposit_dividends(ctx, amount)
    }

    pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
        instructions::update_config(ctx, param, value)
    }

    pub fn set_social_bonus(ctx: Context<SetSocialBonus>, percent: u16) -> Result<()> {
        instructions::set_social_bonus(ctx, percent)
    }

    pub fn set_social_bonus_batch(
        ctx: Context<SetSocialBonusBatch>,
        percents: Vec<u16>,
    ) -> Result<u32> {
        instructions::set_social_bonus_batch(ctx, percents)
    }

    pub fn activate_wind_down(ctx: Context<WindDownSwitch>, confirmation: String) -> Result<()> {
        instructions::activate_wind_down(ctx, confirmation)
    }

    pub fn cancel_wind_down(ctx: Context<WindDownSwitch>, confirmation: String) -> Result<()> {
        instructions::cancel_wind_down(ctx, confirmation)
    }

    pub fn sweep_custody(ctx: Context<SweepCustody>) -> Result<()> {
        instructions::sweep_custody(ctx)
    }
}
