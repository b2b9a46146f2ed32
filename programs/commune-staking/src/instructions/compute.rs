use anchor_lang::prelude::*;

use crate::accrual::engine;
use crate::error::ErrorCode;
use crate::states::*;
use crate::CATCH_UP_STEP_BUDGET;

/// Accounts for the compute-only read views.
///
/// Everything here is read-only: a view either answers from a full in-memory
/// catch-up within the per-call budget, or fails with `UnboundedCatchUp`
/// without touching any state; the caller then issues precompute calls and
/// retries.
#[derive(Accounts)]
pub struct ComputeEarnings<'info> {
    /// Holder whose stakes are inspected.
    ///
    /// CHECK: Only used as a PDA seed; no data is read from it.
    pub holder: UncheckedAccount<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Period ledger replayed in memory.
    #[account(address = global_config.period_ledger)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// The holder's stake collection.
    #[account(
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            holder.key().as_ref()
        ],
        bump = staker_account.bump,
    )]
    pub staker_account: Account<'info, StakerAccount>,
}

fn project_holder(
    staker_account: &StakerAccount,
    periods: &[DistributionPeriod],
) -> Result<(u64, u64)> {
    let mut budget = CATCH_UP_STEP_BUDGET;
    let mut dividends = 0u64;
    let mut rewards = 0u64;
    for record in &staker_account.stakes {
        let projection = engine::project_stake(record, periods, &mut budget)?;
        dividends = dividends
            .checked_add(projection.dividends)
            .ok_or(ErrorCode::MathOverflow)?;
        rewards = rewards
            .checked_add(projection.rewards)
            .ok_or(ErrorCode::MathOverflow)?;
    }
    Ok((dividends, rewards))
}

/// Fully-caught-up dividend-asset earnings of the holder, both accrued and
/// still unsettled.
pub fn compute_dividends(ctx: Context<ComputeEarnings>) -> Result<u64> {
    let ledger = ctx.accounts.period_ledger.load()?;
    let (dividends, _) = project_holder(&ctx.accounts.staker_account, ledger.settled())?;
    Ok(dividends)
}

/// Fully-caught-up stake-asset earnings of the holder.
pub fn compute_rewards(ctx: Context<ComputeEarnings>) -> Result<u64> {
    let ledger = ctx.accounts.period_ledger.load()?;
    let (_, rewards) = project_holder(&ctx.accounts.staker_account, ledger.settled())?;
    Ok(rewards)
}

/// Both streams combined.
pub fn compute_total_earnings(ctx: Context<ComputeEarnings>) -> Result<u64> {
    let ledger = ctx.accounts.period_ledger.load()?;
    let (dividends, rewards) = project_holder(&ctx.accounts.staker_account, ledger.settled())?;
    dividends
        .checked_add(rewards)
        .ok_or_else(|| ErrorCode::MathOverflow.into())
}

/// Earnings already checkpointed into accrued balances: payable right now
/// without any further catch-up work, so this view never fails on distance.
pub fn compute_withdrawable(ctx: Context<ComputeEarnings>) -> Result<u64> {
    let staker_account = &ctx.accounts.staker_account;
    let mut payable = 0u64;
    for record in &staker_account.stakes {
        payable = payable
            .checked_add(record.accrued_dividends)
            .and_then(|sum| sum.checked_add(record.accrued_rewards))
            .ok_or(ErrorCode::MathOverflow)?;
    }
    Ok(payable)
}

/// Total live principal of the holder across all records.
pub fn compute_holder_stake(ctx: Context<ComputeEarnings>) -> Result<u64> {
    Ok(ctx.accounts.staker_account.total_principal())
}
