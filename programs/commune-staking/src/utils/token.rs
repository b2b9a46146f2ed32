use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, TransferChecked};

/// Moves tokens out of a program vault, signed by the authority PDA.
#[allow(clippy::too_many_arguments)]
pub fn transfer_from_vault_to_user<'info>(
    authority: AccountInfo<'info>,
    from_vault: AccountInfo<'info>,
    to: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: u64,
    mint_decimals: u8,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            token_program,
            TransferChecked {
                from: from_vault,
                to,
                authority,
                mint,
            },
            signer_seeds,
        ),
        amount,
        mint_decimals,
    )
}

/// Moves tokens from a user's token account into a program vault.
pub fn transfer_from_user_to_vault<'info>(
    signer: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to_vault: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: u64,
    mint_decimals: u8,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_interface::transfer_checked(
        CpiContext::new(
            token_program,
            TransferChecked {
                from,
                to: to_vault,
                authority: signer,
                mint,
            },
        ),
        amount,
        mint_decimals,
    )
}
