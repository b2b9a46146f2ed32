use anchor_lang::prelude::*;

use crate::accrual::{engine, weights};
use crate::error::ErrorCode;
use crate::states::*;
use crate::CATCH_UP_STEP_BUDGET;

/// Accounts required for rolling a matured stake into a fresh lock.
#[derive(Accounts)]
pub struct Restake<'info> {
    /// Holder restaking.
    pub owner: Signer<'info>,

    /// Global configuration (tier bonuses, wind-down state).
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals; the pondered total moves by the re-freeze delta.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger; the record is settled against it before any change.
    #[account(address = global_config.period_ledger)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// The holder's stake collection.
    #[account(
        mut,
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            owner.key().as_ref()
        ],
        bump = staker_account.bump,
    )]
    pub staker_account: Account<'info, StakerAccount>,
}

/// Restarts the lock of record `stake_index` at `new_tier` months.
///
/// The record is fully settled at its old weight first, so periods that
/// already elapsed keep their payout; the new tier only applies going
/// forward.
///
/// # Fails
/// - `NotYetMatured` before `duration_tier * 30` days, unless wind-down is
///   active.
/// - `UnboundedCatchUp` when the record is too far behind; precompute first.
pub fn restake(ctx: Context<Restake>, stake_index: u16, new_tier: u8) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    let new_tier_bonus = weights::tier_bonus_percent(
        new_tier,
        global_config.tier_two_bonus_percent,
        global_config.tier_three_bonus_percent,
    )?;

    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;
    let social_bonus = staker_account.social_bonus_percent;
    let now = Clock::get()?.unix_timestamp as u64;

    let index = stake_index as usize;
    require!(
        index < staker_account.stakes.len(),
        ErrorCode::InvalidStakeIndex
    );
    let record = &mut staker_account.stakes[index];
    require!(
        global_config.wind_down_active || record.is_matured(now),
        ErrorCode::NotYetMatured
    );

    // --- Settle both streams at the old weight before any change ---
    engine::strict_settle(record, ledger.settled(), CATCH_UP_STEP_BUDGET)?;

    // --- Fresh lock, re-frozen weight at the new tier ---
    record.duration_tier = new_tier;
    record.start_timestamp = now;
    record.last_restake_timestamp = now;
    engine::refreeze_pondered(
        record,
        &mut staking_state.total_pondered_stake,
        new_tier_bonus,
        social_bonus,
    )?;
    staking_state.last_update_timestamp = now;

    emit!(Restaked {
        holder: ctx.accounts.owner.key(),
        stake_index,
        new_tier,
        pondered_amount: staker_account.stakes[index].pondered_amount,
    });

    Ok(())
}
