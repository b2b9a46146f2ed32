use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::transfer_from_user_to_vault;

/// Accounts for depositing stake-asset rewards into custody.
///
/// Deposits are permissionless; the next `create_period` picks the amount up
/// as reward-stream surplus. Sending tokens straight to the vault has the
/// same effect; this instruction just makes the intent explicit and
/// indexable.
#[derive(Accounts)]
pub struct DepositRewards<'info> {
    /// The depositing account.
    pub depositor: Signer<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Canonical CMN mint.
    #[account(address = global_config.stake_mint @ ErrorCode::InvalidMint)]
    pub stake_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Depositor's CMN token account.
    #[account(mut)]
    pub depositor_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault receiving the deposit.
    #[account(
        mut,
        address = global_config.stake_vault @ ErrorCode::InvalidVault,
    )]
    pub stake_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// SPL token interface program.
    pub token_program: Interface<'info, TokenInterface>,
}

/// Moves `amount` of CMN into the stake vault as future reward surplus.
pub fn deposit_rewards(ctx: Context<DepositRewards>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    transfer_from_user_to_vault(
        ctx.accounts.depositor.to_account_info(),
        ctx.accounts.depositor_token.to_account_info(),
        ctx.accounts.stake_vault.to_account_info(),
        ctx.accounts.stake_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.stake_mint.decimals,
    )?;
    emit!(RewardsDeposited {
        from: ctx.accounts.depositor.key(),
        amount,
    });
    Ok(())
}

/// Accounts for depositing settlement-asset dividends into custody.
#[derive(Accounts)]
pub struct DepositDividends<'info> {
    /// The depositing account.
    pub depositor: Signer<'info>,

    /// Global configuration.
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// External settlement-asset mint.
    #[account(address = global_config.dividend_mint @ ErrorCode::InvalidMint)]
    pub dividend_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Depositor's settlement-asset token account.
    #[account(mut)]
    pub depositor_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custody vault receiving the deposit.
    #[account(
        mut,
        address = global_config.dividend_vault @ ErrorCode::InvalidVault,
    )]
    pub dividend_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// SPL token interface program.
    pub token_program: Interface<'info, TokenInterface>,
}

/// Moves `amount` of the settlement asset into the dividend vault as future
/// dividend surplus.
pub fn deposit_dividends(ctx: Context<DepositDividends>, amount: u64) -> Result<()> {
    require!(amount > 0, ErrorCode::InvalidAmount);
    transfer_from_user_to_vault(
        ctx.accounts.depositor.to_account_info(),
        ctx.accounts.depositor_token.to_account_info(),
        ctx.accounts.dividend_vault.to_account_info(),
        ctx.accounts.dividend_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.dividend_mint.decimals,
    )?;
    emit!(DividendsDeposited {
        from: ctx.accounts.depositor.key(),
        amount,
    });
    Ok(())
}
