use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::accrual::engine;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_vault_to_user;
use crate::CATCH_UP_STEP_BUDGET;

/// Accounts required for exiting a stake.
#[derive(Accounts)]
pub struct Unstake<'info> {
    /// Holder exiting (payer for ATA creation if needed).
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Global configuration (wind-down state).
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

    /// Period ledger; the record is settled against it before removal.
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

    /// Custody vault paying back principal plus rewards.
    #[account(
        mut,
        address = global_config.stake_vault @ ErrorCode::InvalidVault,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault paying accrued dividends.
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

/// Removes record `stake_index`, paying back its principal plus everything
/// it accrued.
///
/// The record is fully settled first, then swap-removed; indices of the
/// holder's remaining records are not stable across this call. When the last
/// stake in the pool exits, the residues that floor division left in the
/// stream reserves fold back into the pending surplus, so the next period
/// redistributes them instead of stranding them.
///
/// # Fails
/// - `NotYetMatured` before `duration_tier * 30` days, unless wind-down is
///   active.
/// - `UnboundedCatchUp` when the record is too far behind; precompute first.
pub fn unstake(ctx: Context<Unstake>, stake_index: u16) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;
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

    // --- Final settlement of both streams ---
    engine::strict_settle(record, ledger.settled(), CATCH_UP_STEP_BUDGET)?;

    let record = staker_account.stakes.swap_remove(index);
    let principal = record.principal;
    let dividends_paid = record.accrued_dividends;
    let rewards_paid = record.accrued_rewards;

    // --- Global totals and reserves ---
    staking_state.total_stake = staking_state
        .total_stake
        .checked_sub(principal)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_owned_principal = staking_state
        .total_owned_principal
        .checked_sub(principal)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_pondered_stake = staking_state
        .total_pondered_stake
        .checked_sub(record.pondered_amount)
        .ok_or(ErrorCode::MathOverflow)?;
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

    // Last stake out: fold the unattributable remainders back into the
    // pending surplus for the next period.
    if staking_state.total_stake == 0 {
        staking_state.pending_dividends = 0;
        staking_state.pending_rewards = 0;
    }

    // --- Pay principal + rewards, then dividends ---
    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    transfer_from_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.owner_stake_token.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        principal
            .checked_add(rewards_paid)
            .ok_or(ErrorCode::MathOverflow)?,
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

    emit!(Unstaked {
        holder: ctx.accounts.owner.key(),
        principal,
        dividends_paid,
        rewards_paid,
    });

    Ok(())
}
