use anchor_lang::prelude::*;

use crate::accrual::{engine, weights};
use crate::error::ErrorCode;
use crate::states::*;
use crate::CATCH_UP_STEP_BUDGET;

/// Settles every record of `staker_account` at its old weight, then applies
/// the new social bonus and re-freezes each weight. The periods that already
/// elapsed keep the payout the old bonus earned them.
fn settle_and_apply_bonus(
    staker_account: &mut StakerAccount,
    periods: &[DistributionPeriod],
    total_pondered_stake: &mut u128,
    tier_two: u16,
    tier_three: u16,
    percent: u16,
) -> Result<()> {
    let outstanding: u64 = staker_account
        .stakes
        .iter()
        .map(|record| engine::outstanding_steps(record, periods.len() as u64))
        .sum();
    require!(
        outstanding <= CATCH_UP_STEP_BUDGET,
        ErrorCode::UnboundedCatchUp
    );

    for record in staker_account.stakes.iter_mut() {
        engine::strict_settle(record, periods, CATCH_UP_STEP_BUDGET)?;
    }
    staker_account.social_bonus_percent = percent;
    for record in staker_account.stakes.iter_mut() {
        let tier_bonus = weights::tier_bonus_percent(record.duration_tier, tier_two, tier_three)?;
        engine::refreeze_pondered(record, total_pondered_stake, tier_bonus, percent)?;
    }
    Ok(())
}

/// Accounts for changing one holder's eligibility bonus.
#[derive(Accounts)]
pub struct SetSocialBonus<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Holder whose bonus is updated.
    ///
    /// CHECK: Only used as a PDA seed; no data is read from it.
    pub holder: UncheckedAccount<'info>,

    /// Global configuration (tier bonuses for re-freezing).
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals; the pondered total moves by the re-freeze deltas.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger; the holder's records are settled before the change.
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

/// Sets the holder's eligibility bonus, settling their stakes at the old
/// weight first so the change only applies to periods still to come.
///
/// # Fails
/// - `UnboundedCatchUp` when the holder is too far behind; precompute first.
pub fn set_social_bonus(ctx: Context<SetSocialBonus>, percent: u16) -> Result<()> {
    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;
    let staker_account = &mut ctx.accounts.staker_account;

    settle_and_apply_bonus(
        staker_account,
        ledger.settled(),
        &mut staking_state.total_pondered_stake,
        global_config.tier_two_bonus_percent,
        global_config.tier_three_bonus_percent,
        percent,
    )?;
    staking_state.last_update_timestamp = Clock::get()?.unix_timestamp as u64;

    emit!(SocialBonusUpdated {
        holder: ctx.accounts.holder.key(),
        percent,
    });
    Ok(())
}

/// Accounts for the batch eligibility-bonus setter. One writable
/// `StakerAccount` is expected in `remaining_accounts` per entry.
#[derive(Accounts)]
pub struct SetSocialBonusBatch<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Global configuration (tier bonuses for re-freezing).
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// Aggregate totals; the pondered total moves by the re-freeze deltas.
    #[account(
        mut,
        address = global_config.staking_state,
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Period ledger; every touched holder is settled before the change.
    #[account(address = global_config.period_ledger)]
    pub period_ledger: AccountLoader<'info, PeriodLedger>,
}

/// Applies one bonus per remaining `StakerAccount`, in order. Returns how
/// many entries were processed; holders too far behind to settle within the
/// budget are skipped and not counted, so a partial pass never mis-prices a
/// period.
pub fn set_social_bonus_batch(ctx: Context<SetSocialBonusBatch>, percents: Vec<u16>) -> Result<u32> {
    require!(
        percents.len() <= ctx.remaining_accounts.len(),
        ErrorCode::MissingRemainingAccount
    );

    let global_config = &ctx.accounts.global_config;
    let ledger = ctx.accounts.period_ledger.load()?;
    let staking_state = &mut ctx.accounts.staking_state;

    let mut processed = 0u32;
    for (account_info, &percent) in ctx.remaining_accounts.iter().zip(percents.iter()) {
        require_keys_eq!(*account_info.owner, crate::ID, ErrorCode::InvalidOwner);
        let mut data = account_info.try_borrow_mut_data()?;
        let mut staker_account = StakerAccount::try_deserialize(&mut &data[..])?;

        // The account must be the canonical PDA for its recorded holder.
        let expected = Pubkey::create_program_address(
            &[
                STAKER_ACCOUNT_SEED.as_bytes(),
                staker_account.owner.as_ref(),
                &[staker_account.bump],
            ],
            &crate::ID,
        )
        .map_err(|_| error!(ErrorCode::InvalidOwner))?;
        require_keys_eq!(expected, account_info.key(), ErrorCode::InvalidOwner);

        // Too far behind for one budget: leave untouched for a later pass.
        let outstanding: u64 = staker_account
            .stakes
            .iter()
            .map(|record| engine::outstanding_steps(record, ledger.period_count))
            .sum();
        if outstanding > CATCH_UP_STEP_BUDGET {
            continue;
        }

        settle_and_apply_bonus(
            &mut staker_account,
            ledger.settled(),
            &mut staking_state.total_pondered_stake,
            global_config.tier_two_bonus_percent,
            global_config.tier_three_bonus_percent,
            percent,
        )?;
        let mut writer = &mut data[..];
        staker_account.try_serialize(&mut writer)?;
        processed += 1;
        emit!(SocialBonusUpdated {
            holder: staker_account.owner,
            percent,
        });
    }
    staking_state.last_update_timestamp = Clock::get()?.unix_timestamp as u64;

    Ok(processed)
}
