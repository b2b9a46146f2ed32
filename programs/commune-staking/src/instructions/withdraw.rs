use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::accrual::{engine, weights};
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_vault_to_user;
use crate::CATCH_UP_STEP_BUDGET;

/// Accounts required for withdrawing accrued earnings without unstaking.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Holder withdrawing (payer for ATA creation if needed).
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals and stream reserves.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger; every record is settled against it before payout.
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

    /// Program authority PDA (token authority for vault transfers).
    ///
    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Canonical CMN mint.
    #[account(address = global_config.stake_mint @ ErrorCode::InvalidMint)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    /// External settlement-asset mint.
    #[account(address = global_config.dividend_mint @ ErrorCode::InvalidMint)]
    pub dividend_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Custody vault paying rewards.
    #[account(
        mut,
        address = global_config.stake_vault @ ErrorCode::InvalidVault,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault paying dividends.
    #[account(
        mut,
        address = global_config.dividend_vault @ ErrorCode::InvalidVault,
    )]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Holder's CMN token account; created on demand.
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = stake_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_stake_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Holder's settlement-asset token account; created on demand.
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = dividend_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_dividend_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// SPL token interface program.
    pub token_program: Interface<'info, TokenInterface>,

    /// Associated Token Program (for ATA creation).
    pub associated_token_program: Program<'info, AssociatedToken>,

    /// System Program (rent for ATA creation).
    pub system_program: Program<'info, System>,
}

/// Settles every record of the caller, then pays out all accrued earnings:
/// dividends from the dividend vault, rewards from the stake vault.
///
/// Returns the total amount paid across both streams. Calling again without
/// an intervening period pays zero.
///
/// # Fails
/// - `UnboundedCatchUp` when the collection's combined catch-up distance
///   exceeds the per-call budget; precompute first.
pub fn withdraw_dividends_and_rewards(ctx: Context<Withdraw>) -> Result<u64> {
    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let periods = ledger.settled();
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;
    let social_bonus = staker_account.social_bonus_percent;
    let now = Clock::get()?.unix_timestamp as u64;

    // --- The whole collection must be settleable within one budget ---
    let outstanding: u64 = staker_account
        .stakes
        .iter()
        .map(|record| engine::outstanding_steps(record, ledger.period_count))
        .sum();
    require!(
        outstanding <= CATCH_UP_STEP_BUDGET,
        ErrorCode::UnboundedCatchUp
    );

    // --- Settle, re-freeze, and drain each record's accrued balances ---
    let mut dividends_paid = 0u64;
    let mut rewards_paid = 0u64;
    for record in staker_account.stakes.iter_mut() {
        engine::strict_settle(record, periods, CATCH_UP_STEP_BUDGET)?;
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

        let payout = record
            .accrued_dividends
            .checked_add(record.accrued_rewards)
            .ok_or(ErrorCode::MathOverflow)?;
        record.withdrawn_total = record
            .withdrawn_total
            .checked_add(payout)
            .ok_or(ErrorCode::MathOverflow)?;
        dividends_paid = dividends_paid
            .checked_add(record.accrued_dividends)
            .ok_or(ErrorCode::MathOverflow)?;
        rewards_paid = rewards_paid
            .checked_add(record.accrued_rewards)
            .ok_or(ErrorCode::MathOverflow)?;
        record.accrued_dividends = 0;
        record.accrued_rewards = 0;
    }

    // --- Reserves shrink by exactly what leaves custody ---
    staking_state.pending_dividends = staking_state
        .pending_dividends
        .checked_sub(dividends_paid)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.pending_rewards = staking_state
        .pending_rewards
        .checked_sub(rewards_paid)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_dividends_paid = staking_state
        .total_dividends_paid
        .checked_add(dividends_paid)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_rewards_paid = staking_state
        .total_rewards_paid
        .checked_add(rewards_paid)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.last_update_timestamp = now;

    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    transfer_from_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.owner_stake_token.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        rewards_paid,
        ctx.accounts.stake_mint.decimals,
        signer_seeds,
    )?;
    transfer_from_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.dividend_vault.to_account_info(),
        ctx.accounts.owner_dividend_token.to_account_info(),
        ctx.accounts.dividend_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        dividends_paid,
        ctx.accounts.dividend_mint.decimals,
        signer_seeds,
    )?;

    emit!(EarningsWithdrawn {
        holder: ctx.accounts.owner.key(),
        dividends_paid,
        rewards_paid,
    });

    dividends_paid
        .checked_add(rewards_paid)
        .ok_or_else(|| ErrorCode::MathOverflow.into())
}
