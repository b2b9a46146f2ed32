//! Settlement engine: replays unprocessed distribution periods into a stake
//! record's accrued balances, in bounded increments.
//!
//! Every function here is pure over `&[DistributionPeriod]` so the whole
//! engine can be exercised without a running cluster. A *step* is one
//! (period, stream) contribution; the per-call budget counts steps across
//! both streams.

use anchor_lang::prelude::*;
use spl_math::uint::U256;

use crate::error::ErrorCode;
use crate::states::{DistributionPeriod, StakeRecord};

use super::weights;

/// Outcome of a bounded catch-up pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchUp {
    /// (period, stream) contributions processed by this pass.
    pub steps_used: u64,
    /// True when both checkpoints reached the end of the ledger.
    pub fully_settled: bool,
}

/// Read-only projection of a record's fully-caught-up earnings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projection {
    /// Accrued plus still-unsettled dividend-asset earnings.
    pub dividends: u64,
    /// Accrued plus still-unsettled stake-asset earnings.
    pub rewards: u64,
}

/// A period's dividend-stream contribution to a stake: shares by raw
/// principal committed.
pub fn dividend_share(period: &DistributionPeriod, principal: u64) -> Result<u64> {
    let share = (period.new_dividend_amount as u128)
        .checked_mul(principal as u128)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(period.total_stake_at_creation as u128)
        .ok_or(ErrorCode::MathOverflow)?;
    u64::try_from(share).map_err(|_| ErrorCode::MathOverflow.into())
}

/// A period's reward-stream contribution to a stake: shares by the frozen
/// pondered amount. Wide math because the social bonus is unbounded.
pub fn reward_share(period: &DistributionPeriod, pondered_amount: u128) -> Result<u64> {
    let share = U256::from(period.new_reward_amount)
        .checked_mul(U256::from(pondered_amount))
        .ok_or(ErrorCode::MathOverflow)?
        .checked_div(U256::from(period.total_pondered_stake_at_creation))
        .ok_or(ErrorCode::MathOverflow)?;
    if share > U256::from(u64::MAX) {
        return Err(ErrorCode::MathOverflow.into());
    }
    Ok(share.as_u64())
}

/// Steps still needed to bring `record` level with a ledger of
/// `period_count` periods, both streams combined.
pub fn outstanding_steps(record: &StakeRecord, period_count: u64) -> u64 {
    period_count.saturating_sub(record.dividend_checkpoint)
        + period_count.saturating_sub(record.reward_checkpoint)
}

/// Advances a record's checkpoints through at most `budget` steps, crediting
/// accrued balances as it goes. Checkpoints only move forward; invoking this
/// when already caught up processes zero steps and succeeds.
pub fn advance_stake(
    record: &mut StakeRecord,
    periods: &[DistributionPeriod],
    budget: u64,
) -> Result<CatchUp> {
    let latest = periods.len() as u64;
    let mut steps_used = 0u64;

    while record.dividend_checkpoint < latest && steps_used < budget {
        let period = &periods[record.dividend_checkpoint as usize];
        if period.new_dividend_amount > 0 {
            let share = dividend_share(period, record.principal)?;
            record.accrued_dividends = record
                .accrued_dividends
                .checked_add(share)
                .ok_or(ErrorCode::MathOverflow)?;
        }
        record.dividend_checkpoint += 1;
        steps_used += 1;
    }

    while record.reward_checkpoint < latest && steps_used < budget {
        let period = &periods[record.reward_checkpoint as usize];
        if period.new_reward_amount > 0 {
            let share = reward_share(period, record.pondered_amount)?;
            record.accrued_rewards = record
                .accrued_rewards
                .checked_add(share)
                .ok_or(ErrorCode::MathOverflow)?;
        }
        record.reward_checkpoint += 1;
        steps_used += 1;
    }

    Ok(CatchUp {
        steps_used,
        fully_settled: record.dividend_checkpoint == latest && record.reward_checkpoint == latest,
    })
}

/// Fully settles a record or fails with `UnboundedCatchUp` without having
/// been given enough budget. Used by every weight-mutating operation, which
/// must flush history at the old weight before any change applies.
pub fn strict_settle(
    record: &mut StakeRecord,
    periods: &[DistributionPeriod],
    budget: u64,
) -> Result<u64> {
    if outstanding_steps(record, periods.len() as u64) > budget {
        return Err(ErrorCode::UnboundedCatchUp.into());
    }
    let pass = advance_stake(record, periods, budget)?;
    Ok(pass.steps_used)
}

/// Computes what a full catch-up would credit, without mutating the record.
/// Draws from a shared `budget` so multi-record reads stay bounded per call.
pub fn project_stake(
    record: &StakeRecord,
    periods: &[DistributionPeriod],
    budget: &mut u64,
) -> Result<Projection> {
    let needed = outstanding_steps(record, periods.len() as u64);
    if needed > *budget {
        return Err(ErrorCode::UnboundedCatchUp.into());
    }
    *budget -= needed;

    let mut scratch = *record;
    advance_stake(&mut scratch, periods, needed)?;
    Ok(Projection {
        dividends: scratch.accrued_dividends,
        rewards: scratch.accrued_rewards,
    })
}

/// Recomputes a fully-settled record's pondered amount from the current
/// bonuses and folds the delta into the global total. Must only be called
/// after `strict_settle` (or an `advance_stake` that reported full
/// settlement), so no period is ever replayed at a weight it did not have.
pub fn refreeze_pondered(
    record: &mut StakeRecord,
    total_pondered_stake: &mut u128,
    tier_bonus: u16,
    social_bonus: u16,
) -> Result<()> {
    let new_pondered = weights::pondered_amount(record.principal, tier_bonus, social_bonus);
    *total_pondered_stake = total_pondered_stake
        .checked_sub(record.pondered_amount)
        .ok_or(ErrorCode::MathOverflow)?
        .checked_add(new_pondered)
        .ok_or(ErrorCode::MathOverflow)?;
    record.pondered_amount = new_pondered;
    Ok(())
}
