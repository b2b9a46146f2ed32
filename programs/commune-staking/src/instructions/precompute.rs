use anchor_lang::prelude::*;

use crate::accrual::{engine, weights};
use crate::error::ErrorCode;
use crate::states::*;
use crate::CATCH_UP_STEP_BUDGET;

/// Accounts for the bounded catch-up entry points.
///
/// Anyone may pay to advance anyone's checkpoints: the result is identical
/// no matter who triggers the work or in how many increments.
#[derive(Accounts)]
pub struct Precompute<'info> {
    /// Whoever pays for the catch-up work.
    pub payer: Signer<'info>,

    /// Holder whose stakes are advanced.
    ///
    /// CHECK: Only used as a PDA seed; no data is read from it.
    pub holder: UncheckedAccount<'info>,

    /// Global configuration (tier bonuses for re-freezing).
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals; the pondered total moves when a record re-freezes.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger replayed into the records.
    #[account(address = global_config.period_ledger)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// The holder's stake collection.
    #[account(
        mut,
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            holder.key().as_ref()
        ],
        bump = staker_account.bump,
    )]
    pub staker_account: Account<'info, StakerAccount>,
}

/// Advances one record's checkpoints through at most the per-call budget.
/// Idempotent: invoking it when already caught up processes zero periods.
pub fn precompute_stake(ctx: Context<Precompute>, stake_index: u16) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;
    let social_bonus = staker_account.social_bonus_percent;

    let index = stake_index as usize;
    require!(
        index < staker_account.stakes.len(),
        ErrorCode::InvalidStakeIndex
    );
    let record = &mut staker_account.stakes[index];

    let pass = engine::advance_stake(record, ledger.settled(), CATCH_UP_STEP_BUDGET)?;
    if pass.fully_settled {
        let tier_bonus = weights::tier_bonus_percent(
            record.duration_tier,
            global_config.tier_two_bonus_percent,
            global_config.tier_three_bonus_percent,
        )?;
        engine::refreeze_pondered(
            record,
            &mut staking_state.total_pondered_stake,
            tier_bonus,
            social_bonus,
        )?;
    }
    staking_state.last_update_timestamp = Clock::get()?.unix_timestamp as u64;

    Ok(())
}

/// Advances all of a holder's records, sharing one per-call budget between
/// them in storage order.
pub fn precompute_all(ctx: Context<Precompute>) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;
    let social_bonus = staker_account.social_bonus_percent;

    let mut budget = CATCH_UP_STEP_BUDGET;
    for record in staker_account.stakes.iter_mut() {
        if budget == 0 {
            break;
        }
        let pass = engine::advance_stake(record, ledger.settled(), budget)?;
        budget -= pass.steps_used;
        if pass.fully_settled {
            let tier_bonus = weights::tier_bonus_percent(
                record.duration_tier,
                global_config.tier_two_bonus_percent,
                global_config.tier_three_bonus_percent,
            )?;
            engine::refreeze_pondered(
                record,
                &mut staking_state.total_pondered_stake,
                tier_bonus,
                social_bonus,
            )?;
        }
    }
    staking_state.last_update_timestamp = Clock::get()?.unix_timestamp as u64;

    Ok(())
}
