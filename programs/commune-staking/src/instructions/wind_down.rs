use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_vault_to_user;
use crate::{WIND_DOWN_CONFIRMATION, WIND_DOWN_COOLING_SECONDS};

/// Accounts for the wind-down activation/cancellation switches.
#[derive(Accounts)]
pub struct WindDownSwitch<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Global configuration carrying the wind-down state.
    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,
}

/// Switches wind-down mode on. While active, lock maturity requirements on
/// restake/unstake are waived, and an uncanceled activation starts the
/// cooling-off clock towards `sweep_custody`.
///
/// # Fails
/// - `InvalidConfirmation` unless `confirmation` matches the exact phrase.
/// - `WindDownAlreadyActive` if already switched on.
pub fn activate_wind_down(ctx: Context<WindDownSwitch>, confirmation: String) -> Result<()> {
    require!(
        confirmation == WIND_DOWN_CONFIRMATION,
        ErrorCode::InvalidConfirmation
    );
    let global_config = &mut ctx.accounts.global_config;
    require!(
        !global_config.wind_down_active,
        ErrorCode::WindDownAlreadyActive
    );

    let now = Clock::get()?.unix_timestamp as u64;
    global_config.wind_down_active = true;
    global_config.wind_down_activated_at = now;

    emit!(WindDownActivated { activated_at: now });
    Ok(())
}

/// Switches wind-down mode back off, re-imposing maturity requirements and
/// resetting the cooling-off clock.
///
/// # Fails
/// - `InvalidConfirmation` unless `confirmation` matches the exact phrase.
/// - `WindDownNotActive` if wind-down is not switched on.
pub fn cancel_wind_down(ctx: Context<WindDownSwitch>, confirmation: String) -> Result<()> {
    require!(
        confirmation == WIND_DOWN_CONFIRMATION,
        ErrorCode::InvalidConfirmation
    );
    let global_config = &mut ctx.accounts.global_config;
    require!(global_config.wind_down_active, ErrorCode::WindDownNotActive);

    let now = Clock::get()?.unix_timestamp as u64;
    global_config.wind_down_active = false;
    global_config.wind_down_activated_at = 0;

    emit!(WindDownCanceled { canceled_at: now });
    Ok(())
}

/// Accounts for the post-cooling-off custody sweep.
#[derive(Accounts)]
pub struct SweepCustody<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Global configuration carrying the wind-down state.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

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

    /// Custody vault to drain of CMN.
    #[account(
        mut,
        address = global_config.stake_vault @ ErrorCode::InvalidVault,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault to drain of the settlement asset.
    #[account(
        mut,
        address = global_config.dividend_vault @ ErrorCode::InvalidVault,
    )]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CMN token account of the configured sweep destination.
    #[account(
        mut,
        constraint = destination_stake_token.owner == global_config.sweep_destination @ ErrorCode::InvalidVault,
        constraint = destination_stake_token.mint == global_config.stake_mint @ ErrorCode::InvalidMint,
    )]
    pub destination_stake_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Settlement-asset token account of the configured sweep destination.
    #[account(
        mut,
        constraint = destination_dividend_token.owner == global_config.sweep_destination @ ErrorCode::InvalidVault,
        constraint = destination_dividend_token.mint == global_config.dividend_mint @ ErrorCode::InvalidMint,
    )]
    pub destination_dividend_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// SPL token interface program.
    pub token_program: Interface<'info, TokenInterface>,
}

/// Drains the system's entire remaining custody to the configured
/// destination. Only available once wind-down has been active, uncanceled,
/// for the full cooling-off period.
///
/// # Fails
/// - `WindDownNotActive` before activation or after a cancellation.
/// - `CoolingOffNotElapsed` inside the 120-day window.
pub fn sweep_custody(ctx: Context<SweepCustody>) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    require!(global_config.wind_down_active, ErrorCode::WindDownNotActive);

    let now = Clock::get()?.unix_timestamp as u64;
    let unlocked_at = global_config
        .wind_down_activated_at
        .checked_add(WIND_DOWN_COOLING_SECONDS)
        .ok_or(ErrorCode::MathOverflow)?;
    require!(now >= unlocked_at, ErrorCode::CoolingOffNotElapsed);

    let stake_amount = ctx.accounts.stake_vault.amount;
    let dividend_amount = ctx.accounts.dividend_vault.amount;
    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    transfer_from_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.destination_stake_token.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        stake_amount,
        ctx.accounts.stake_mint.decimals,
        signer_seeds,
    )?;
    transfer_from_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.dividend_vault.to_account_info(),
        ctx.accounts.destination_dividend_token.to_account_info(),
        ctx.accounts.dividend_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        dividend_amount,
        ctx.accounts.dividend_mint.decimals,
        signer_seeds,
    )?;

    emit!(CustodySwept {
        destination: global_config.sweep_destination,
        stake_amount,
        dividend_amount,
    });
    Ok(())
}
