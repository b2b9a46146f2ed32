use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::accrual::weights;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_user_to_vault;
use crate::{BASE_UNIT, MAX_STAKE_BASE_UNITS};

/// Accounts required for locking new principal.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// Holder locking principal.
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals, updated with the new principal and weight.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger; read to position the new record's checkpoints.
    #[account(address = global_config.period_ledger)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// Per-holder stake collection (created lazily).
    #[account(
        init_if_needed,
        seeds = [
            STAKER_ACCOUNT_SEED.as_bytes(),
            owner.key().as_ref()
        ],
        bump,
        payer = owner,
        space = StakerAccount::LEN
    )]
    pub staker_account: Account<'info, StakerAccount>,

    /// Canonical CMN mint.
    #[account(address = global_config.stake_mint @ ErrorCode::InvalidMint)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Holder's CMN token account the principal is debited from.
    #[account(
        mut,
        associated_token::mint = stake_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_stake_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault receiving the principal.
    #[account(
        mut,
        address = global_config.stake_vault @ ErrorCode::InvalidVault,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// SPL token interface program.
    pub token_program: Interface<'info, TokenInterface>,

    /// Associated Token Program (for lazy ATA checks).
    pub associated_token_program: Program<'info, AssociatedToken>,

    /// System Program (for staker account creation).
    pub system_program: Program<'info, System>,
}

/// Locks `amount` of CMN for `duration_tier` months.
///
/// The new record's checkpoints start at the current period count, so it owes
/// nothing for distribution periods that predate it.
///
/// # Fails
/// - `InvalidAmount` unless `amount` is a whole multiple of `BASE_UNIT`
///   within `[1, 2^32 - 1]` base units.
/// - `InvalidDurationTier` unless `duration_tier` is 1, 2 or 3.
/// - `TooManyStakes` once the holder's collection is full.
pub fn stake(ctx: Context<Stake>, amount: u64, duration_tier: u8) -> Result<()> {
    // --- Validate amount and tier ---
    require!(amount > 0, ErrorCode::InvalidAmount);
    require!(amount % BASE_UNIT == 0, ErrorCode::InvalidAmount);
    let base_units = amount / BASE_UNIT;
    require!(base_units <= MAX_STAKE_BASE_UNITS, ErrorCode::InvalidAmount);

    let global_config = &ctx.accounts.global_config;
    let tier_bonus = weights::tier_bonus_percent(
        duration_tier,
        global_config.tier_two_bonus_percent,
        global_config.tier_three_bonus_percent,
    )?;

    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;

    // --- Lazy init of the holder's collection ---
    if staker_account.owner == Pubkey::default() {
        staker_account.owner = ctx.accounts.owner.key();
        staker_account.bump = ctx.bumps.staker_account;
    }
    require!(
        staker_account.stakes.len() < MAX_STAKES_PER_HOLDER,
        ErrorCode::TooManyStakes
    );

    // --- Create the record with checkpoints at the latest period ---
    let pondered_amount = weights::pondered_amount(
        amount,
        tier_bonus,
        staker_account.social_bonus_percent,
    );
    let now = Clock::get()?.unix_timestamp as u64;
    staker_account.stakes.push(StakeRecord {
        principal: amount,
        duration_tier,
        start_timestamp: now,
        last_restake_timestamp: 0,
        pondered_amount,
        dividend_checkpoint: ledger.period_count,
        reward_checkpoint: ledger.period_count,
        accrued_dividends: 0,
        accrued_rewards: 0,
        withdrawn_total: 0,
    });

    // --- Global totals ---
    staking_state.total_stake = staking_state
        .total_stake
        .checked_add(amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_owned_principal = staking_state
        .total_owned_principal
        .checked_add(amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.total_pondered_stake = staking_state
        .total_pondered_stake
        .checked_add(pondered_amount)
        .ok_or(ErrorCode::MathOverflow)?;
    staking_state.last_update_timestamp = now;

    // --- Debit the principal into custody ---
    transfer_from_user_to_vault(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_stake_token.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.stake_mint.decimals,
    )?;

    emit!(Staked {
        holder: ctx.accounts.owner.key(),
        amount,
        duration_tier,
        pondered_amount,
    });

    Ok(())
}
