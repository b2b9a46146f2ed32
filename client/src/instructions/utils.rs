use anchor_lang::AccountDeserialize;
use anyhow::Result;
use commune_staking::states::{GLOBAL_CONFIG_SEED, STAKER_ACCOUNT_SEED, STAKING_STATE_SEED};
use solana_sdk::{account::Account, pubkey::Pubkey};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(Into::into)
}

pub fn get_global_config_address(program_id: &Pubkey) -> Pubkey {
    let (global_config, _bump) =
        Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED.as_bytes()], program_id);
    global_config
}

pub fn get_authority_address(program_id: &Pubkey) -> Pubkey {
    let (authority, _bump) =
        Pubkey::find_program_address(&[commune_staking::AUTH_SEED.as_bytes()], program_id);
    authority
}

pub fn get_staking_state_address(program_id: &Pubkey) -> Pubkey {
    let (staking_state, _bump) =
        Pubkey::find_program_address(&[STAKING_STATE_SEED.as_bytes()], program_id);
    staking_state
}

pub fn get_stake_vault_address(program_id: &Pubkey) -> Pubkey {
    let (stake_vault, _bump) =
        Pubkey::find_program_address(&[commune_staking::STAKE_VAULT_SEED.as_bytes()], program_id);
    stake_vault
}

pub fn get_dividend_vault_address(program_id: &Pubkey) -> Pubkey {
    let (dividend_vault, _bump) = Pubkey::find_program_address(
        &[commune_staking::DIVIDEND_VAULT_SEED.as_bytes()],
        program_id,
    );
    dividend_vault
}

pub fn get_staker_account_address(holder: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (staker_account, _bump) = Pubkey::find_program_address(
        &[STAKER_ACCOUNT_SEED.as_bytes(), holder.as_ref()],
        program_id,
    );
    staker_account
}
