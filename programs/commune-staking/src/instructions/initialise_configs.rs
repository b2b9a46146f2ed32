use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

use crate::error::ErrorCode;
use crate::states::*;
use crate::{DIVIDEND_VAULT_SEED, STAKE_VAULT_SEED};

/// Accounts context for `initialise_configs`.
///
/// This handler:
/// - Initializes global protocol configuration and the aggregate staking
///   state.
/// - Takes ownership of a pre-created, zeroed period-ledger account (the
///   ledger is too large for CPI allocation, so the deploy client creates it
///   directly and passes it in here).
/// - Creates the two custody vaults, with the program authority PDA as their
///   token authority.
#[derive(Accounts)]
pub struct InitialiseConfigs<'info> {
    /// Admin signer (must match the program-level admin id).
    #[account(
        mut,
        address = crate::admin::id() @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Program authority PDA, token authority for both vaults.
    ///
    /// CHECK: PDA derivation enforced via seeds. Not read as an account.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Global configuration account holding protocol parameters.
    #[account(
        init,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
        payer = owner,
        space = GlobalConfig::LEN
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals and stream reserves.
    #[account(
        init,
        seeds = [STAKING_STATE_SEED.as_bytes()],
        bump,
        payer = owner,
        space = StakingState::LEN
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Pre-created, zeroed distribution-period ledger.
    #[account(zero)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,

    /// Canonical CMN mint; principal is counted in whole tokens of it.
    #[account(constraint = stake_mint.decimals == 9 @ ErrorCode::InvalidMint)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    /// External settlement-asset mint paying the dividend stream.
    pub dividend_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Program-owned vault for staked principal and reward surplus.
    #[account(
        init,
        seeds = [STAKE_VAULT_SEED.as_bytes()],
        bump,
        payer = owner,
        token::mint = stake_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Program-owned vault for dividend-asset deposits.
    #[account(
        init,
        seeds = [DIVIDEND_VAULT_SEED.as_bytes()],
        bump,
        payer = owner,
        token::mint = dividend_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program interface (required for vault creation).
    pub token_program: Interface<'info, TokenInterface>,

    /// Solana System Program.
    pub system_program: Program<'info, System>,
}

/// Initializes global protocol configuration, the staking state, the period
/// ledger and both custody vaults.
pub fn initialise_configs(
    ctx: Context<InitialiseConfigs>,
    admin: Pubkey,
    sweep_destination: Pubkey,
    tier_two_bonus_percent: u16,
    tier_three_bonus_percent: u16,
) -> Result<()> {
    require!(
        tier_two_bonus_percent <= MAX_TIER_TWO_BONUS,
        ErrorCode::BonusTooHigh
    );
    require!(
        tier_three_bonus_percent <= MAX_TIER_THREE_BONUS,
        ErrorCode::BonusTooHigh
    );
    require_keys_neq!(admin, Pubkey::default());

    // ---------------------------
    // 1) Write global config
    // ---------------------------
    let global_config = ctx.accounts.global_config.deref_mut();
    global_config.bump = ctx.bumps.global_config;
    global_config.admin = admin;
    global_config.stake_mint = ctx.accounts.stake_mint.key();
    global_config.dividend_mint = ctx.accounts.dividend_mint.key();
    global_config.stake_vault = ctx.accounts.stake_vault.key();
    global_config.dividend_vault = ctx.accounts.dividend_vault.key();
    global_config.staking_state = ctx.accounts.staking_state.key();
    global_config.period_ledger = ctx.accounts.period_ledger.key();
    global_config.sweep_destination = sweep_destination;
    global_config.tier_two_bonus_percent = tier_two_bonus_percent;
    global_config.tier_three_bonus_percent = tier_three_bonus_percent;
    global_config.wind_down_active = false;
    global_config.wind_down_activated_at = 0;
    msg!("Global Config initialized");

    // ---------------------------
    // 2) Initialize staking state and claim the ledger
    // ---------------------------
    let staking_state = ctx.accounts.staking_state.deref_mut();
    staking_state.bump = ctx.bumps.staking_state;
    staking_state.last_update_timestamp = Clock::get()?.unix_timestamp as u64;

    let ledger = ctx.accounts.period_ledger.load_init()?;
    require_eq!(ledger.period_count, 0, ErrorCode::InvalidParam);

    emit!(GlobalConfigInitialized {
        admin,
        stake_mint: ctx.accounts.stake_mint.key(),
        dividend_mint: ctx.accounts.dividend_mint.key(),
        stake_vault: ctx.accounts.stake_vault.key(),
        dividend_vault: ctx.accounts.dividend_vault.key(),
        staking_state: ctx.accounts.staking_state.key(),
        period_ledger: ctx.accounts.period_ledger.key(),
        tier_two_bonus_percent,
        tier_three_bonus_percent,
    });
    Ok(())
}
