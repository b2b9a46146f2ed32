use anchor_lang::prelude::*;
use anchor_spl::token_interface::TokenAccount;

use crate::error::ErrorCode;
use crate::states::*;

/// Accounts for the `can_create_period` read view.
#[derive(Accounts)]
pub struct InspectPeriod<'info> {
    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals and stream reserves.
    #[account(address = global_config.staking_state)]
    pub staking_state: Account<'info, StakingState>,

    /// Custody vault for principal and reward surplus.
    #[account(address = global_config.stake_vault @ ErrorCode::InvalidVault)]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault for dividend deposits.
    #[account(address = global_config.dividend_vault @ ErrorCode::InvalidVault)]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,
}

/// True iff a distribution period could be created right now: at least one
/// staker and at least one stream with fresh surplus.
pub fn can_create_period(ctx: Context<InspectPeriod>) -> Result<bool> {
    Ok(ctx.accounts.staking_state.can_create_period(
        ctx.accounts.stake_vault.amount,
        ctx.accounts.dividend_vault.amount,
    ))
}

/// Accounts required to freeze a new distribution period.
#[derive(Accounts)]
pub struct CreatePeriod<'info> {
    /// Whoever triggers the snapshot; creation is permissionless.
    pub payer: Signer<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals; the surpluses move into the pending reserves.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger receiving the new record.
    #[account(
        mut,
        address = global_config.period_ledger,
    )]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// Custody vault for principal and reward surplus.
    #[account(address = global_config.stake_vault @ ErrorCode::InvalidVault)]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault for dividend deposits.
    #[account(address = global_config.dividend_vault @ ErrorCode::InvalidVault)]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,
}

/// Appends a new distribution period snapshotting the fresh surpluses of
/// both streams against the current totals, then moves those surpluses into
/// the pending reserves so they are never counted twice.
///
/// # Fails
/// - `NothingToDistribute` without stakers or without fresh surplus, which
///   also guarantees no period ever has a zero total weight.
/// - `PeriodLedgerFull` at ledger capacity.
pub fn create_period(ctx: Context<CreatePeriod>) -> Result<()> {
    let staking_state = &mut ctx.accounts.staking_state;

    let new_reward_amount = staking_state.reward_surplus(ctx.accounts.stake_vault.amount);
    let new_dividend_amount = staking_state.dividend_surplus(ctx.accounts.dividend_vault.amount);
    require!(
        staking_state.total_stake > 0 && (new_reward_amount > 0 || new_dividend_amount > 0),
        ErrorCode::NothingToDistribute
    );

    let now = Clock::get()?.unix_timestamp as u64;
    let mut ledger = ctx.accounts.period_ledger.load_mut()?;
    let index = ledger.append(
        new_dividend_amount,
        new_reward_amount,
        staking_state.total_stake,
        staking_state.total_pondered_stake,
        now,
    )?;

    staking_state.pending_dividends = staking_state
        .pending_dividends
        .checked_add(new_dividend_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.pending_rewards = staking_state
        .pending_rewards
        .checked_add(new_reward_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_dividends_distributed = staking_state
        .total_dividends_distributed
        .checked_add(new_dividend_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_rewards_distributed = staking_state
        .total_rewards_distributed
        .checked_add(new_reward_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.last_update_timestamp = now;

    emit!(PeriodCreated {
        index,
        new_dividend_amount,
        new_reward_amount,
        total_stake_at_creation: staking_state.total_stake,
        total_pondered_stake_at_creation: staking_state.total_pondered_stake,
    });

    Ok(())
}
