use anchor_lang::prelude::*;

use crate::error::ErrorCode;
use crate::states::*;

/// Accounts context for the `update_config` instruction.
///
/// Only the current `admin` in `global_config` or the program-level admin
/// defined in `crate::admin::id()` may update configuration parameters.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Global configuration account to be updated.
    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// System program (not directly used in updates but required for Anchor context).
    pub system_program: Program<'info, System>,
}

/// Updates selected fields of the global configuration.
///
/// # Param Mapping
/// - `0`: **Admin change** → new admin Pubkey via `remaining_accounts[0]`.
/// - `1`: **tier_two_bonus_percent** → capped at 100.
/// - `2`: **tier_three_bonus_percent** → capped at 200.
/// - `3`: **Sweep destination change** → new Pubkey via `remaining_accounts[0]`.
///
/// Tier bonus changes take effect at each stake's next full settlement: the
/// frozen weight carried by a record stays exactly what every period since
/// its last settlement was created against, so already-elapsed periods keep
/// their payout.
///
/// # Errors
/// - `InvalidOwner`: caller is not an authorized admin.
/// - `BonusTooHigh`: tier bonus outside its cap; nothing changes.
/// - `MissingRemainingAccount`: pubkey param without a remaining account.
/// - `InvalidParam`: unknown selector.
pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    match param {
        // Update admin (requires new admin key from remaining_accounts[0])
        0 => {
            let new_admin = *ctx
                .remaining_accounts
                .iter()
                .next()
                .ok_or(error!(ErrorCode::MissingRemainingAccount))?
                .key;
            require_keys_neq!(new_admin, Pubkey::default());
            global_config.admin = new_admin;
        }
        // Update two-month tier bonus
        1 => {
            let percent = u16::try_from(value).map_err(|_| ErrorCode::BonusTooHigh)?;
            require!(percent <= MAX_TIER_TWO_BONUS, ErrorCode::BonusTooHigh);
            global_config.tier_two_bonus_percent = percent;
        }
        // Update three-month tier bonus
        2 => {
            let percent = u16::try_from(value).map_err(|_| ErrorCode::BonusTooHigh)?;
            require!(percent <= MAX_TIER_THREE_BONUS, ErrorCode::BonusTooHigh);
            global_config.tier_three_bonus_percent = percent;
        }
        // Update wind-down sweep destination
        3 => {
            let destination = *ctx
                .remaining_accounts
                .iter()
                .next()
                .ok_or(error!(ErrorCode::MissingRemainingAccount))?
                .key;
            require_keys_neq!(destination, Pubkey::default());
            global_config.sweep_destination = destination;
        }
        // Invalid parameter selector
        _ => return Err(error!(ErrorCode::InvalidParam)),
    }

    emit!(ConfigUpdated {
        admin: global_config.admin,
        tier_two_bonus_percent: global_config.tier_two_bonus_percent,
        tier_three_bonus_percent: global_config.tier_three_bonus_percent,
        sweep_destination: global_config.sweep_destination,
    });
    Ok(())
}
