use anchor_client::{Client, Cluster, Program};
use anyhow::Result;
use solana_sdk::signature::Keypair;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program};
use spl_associated_token_account::get_associated_token_address;

use commune_staking::accounts as staking_accounts;
use commune_staking::instruction as staking_instructions;
use std::rc::Rc;

use crate::instructions::utils::{
    get_authority_address, get_dividend_vault_address, get_global_config_address,
    get_stake_vault_address, get_staker_account_address, get_staking_state_address,
};

use super::super::{read_keypair_file, ClientConfig};

fn staking_program(config: &ClientConfig, keypair_path: &str) -> Result<Program<Rc<Keypair>>> {
    let payer = read_keypair_file(keypair_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    let client = Client::new(url, Rc::new(payer));
    Ok(client.program(config.staking_program)?)
}

#[allow(clippy::too_many_arguments)]
pub fn initialise_configs_instr(
    config: &ClientConfig,
    period_ledger: Pubkey,
    stake_mint: Pubkey,
    dividend_mint: Pubkey,
    admin: Pubkey,
    sweep_destination: Pubkey,
    tier_two_bonus_percent: u16,
    tier_three_bonus_percent: u16,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let instructions = program
        .request()
        .accounts(staking_accounts::InitialiseConfigs {
            owner: program.payer(),
            authority: get_authority_address(&program.id()),
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger,
            stake_mint,
            dividend_mint,
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(staking_instructions::InitialiseConfigs {
            admin,
            sweep_destination,
            tier_two_bonus_percent,
            tier_three_bonus_percent,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn stake_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    amount: u64,
    duration_tier: u8,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let owner = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::Stake {
            owner,
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            staker_account: get_staker_account_address(&owner, &program.id()),
            stake_mint,
            owner_stake_token: get_associated_token_address(&owner, &stake_mint),
            stake_vault: get_stake_vault_address(&program.id()),
            token_program: spl_token::id(),
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(staking_instructions::Stake {
            amount,
            duration_tier,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn restake_instr(
    config: &ClientConfig,
    stake_index: u16,
    new_tier: u8,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let owner = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::Restake {
            owner,
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            staker_account: get_staker_account_address(&owner, &program.id()),
        })
        .args(staking_instructions::Restake {
            stake_index,
            new_tier,
        })
        .instructions()?;
    Ok(instructions)
}

pub fn unstake_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    dividend_mint: Pubkey,
    stake_index: u16,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let owner = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::Unstake {
            owner,
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            staker_account: get_staker_account_address(&owner, &program.id()),
            authority: get_authority_address(&program.id()),
            stake_mint,
            dividend_mint,
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
            owner_stake_token: get_associated_token_address(&owner, &stake_mint),
            owner_dividend_token: get_associated_token_address(&owner, &dividend_mint),
            token_program: spl_token::id(),
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(staking_instructions::Unstake { stake_index })
        .instructions()?;
    Ok(instructions)
}

pub fn withdraw_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    dividend_mint: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let owner = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::Withdraw {
            owner,
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            staker_account: get_staker_account_address(&owner, &program.id()),
            authority: get_authority_address(&program.id()),
            stake_mint,
            dividend_mint,
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
            owner_stake_token: get_associated_token_address(&owner, &stake_mint),
            owner_dividend_token: get_associated_token_address(&owner, &dividend_mint),
            token_program: spl_token::id(),
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(staking_instructions::WithdrawDividendsAndRewards {})
        .instructions()?;
    Ok(instructions)
}

fn precompute_accounts(
    config: &ClientConfig,
    program: &Program<Rc<Keypair>>,
    holder: Pubkey,
) -> Result<staking_accounts::Precompute> {
    Ok(staking_accounts::Precompute {
        payer: program.payer(),
        holder,
        global_config: get_global_config_address(&program.id()),
        staking_state: get_staking_state_address(&program.id()),
        period_ledger: fetch_period_ledger(config)?,
        staker_account: get_staker_account_address(&holder, &program.id()),
    })
}

pub fn precompute_stake_instr(
    config: &ClientConfig,
    holder: Pubkey,
    stake_index: u16,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let accounts = precompute_accounts(config, &program, holder)?;
    let instructions = program
        .request()
        .accounts(accounts)
        .args(staking_instructions::PrecomputeStake { stake_index })
        .instructions()?;
    Ok(instructions)
}

pub fn precompute_all_instr(config: &ClientConfig, holder: Pubkey) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let accounts = precompute_accounts(config, &program, holder)?;
    let instructions = program
        .request()
        .accounts(accounts)
        .args(staking_instructions::PrecomputeAll {})
        .instructions()?;
    Ok(instructions)
}

/// Which read view of a holder's earnings to build.
#[derive(Clone, Copy, Debug)]
pub enum EarningsView {
    Dividends,
    Rewards,
    TotalEarnings,
    Withdrawable,
    HolderStake,
}

pub fn compute_earnings_instr(
    config: &ClientConfig,
    holder: Pubkey,
    view: EarningsView,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let accounts = staking_accounts::ComputeEarnings {
        holder,
        global_config: get_global_config_address(&program.id()),
        period_ledger: fetch_period_ledger(config)?,
        staker_account: get_staker_account_address(&holder, &program.id()),
    };
    let request = program.request().accounts(accounts);
    let instructions = match view {
        EarningsView::Dividends => request.args(staking_instructions::ComputeDividends {}),
        EarningsView::Rewards => request.args(staking_instructions::ComputeRewards {}),
        EarningsView::TotalEarnings => request.args(staking_instructions::ComputeTotalEarnings {}),
        EarningsView::Withdrawable => request.args(staking_instructions::ComputeWithdrawable {}),
        EarningsView::HolderStake => request.args(staking_instructions::ComputeHolderStake {}),
    }
    .instructions()?;
    Ok(instructions)
}

pub fn can_create_period_instr(config: &ClientConfig) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let instructions = program
        .request()
        .accounts(staking_accounts::InspectPeriod {
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
        })
        .args(staking_instructions::CanCreatePeriod {})
        .instructions()?;
    Ok(instructions)
}

pub fn create_period_instr(config: &ClientConfig) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let instructions = program
        .request()
        .accounts(staking_accounts::CreatePeriod {
            payer: program.payer(),
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
        })
        .args(staking_instructions::CreatePeriod {})
        .instructions()?;
    Ok(instructions)
}

pub fn deposit_rewards_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let depositor = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::DepositRewards {
            depositor,
            global_config: get_global_config_address(&program.id()),
            stake_mint,
            depositor_token: get_associated_token_address(&depositor, &stake_mint),
            stake_vault: get_stake_vault_address(&program.id()),
            token_program: spl_token::id(),
        })
        .args(staking_instructions::DepositRewards { amount })
        .instructions()?;
    Ok(instructions)
}

pub fn deposit_dividends_instr(
    config: &ClientConfig,
    dividend_mint: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.payer_path)?;
    let depositor = program.payer();
    let instructions = program
        .request()
        .accounts(staking_accounts::DepositDividends {
            depositor,
            global_config: get_global_config_address(&program.id()),
            dividend_mint,
            depositor_token: get_associated_token_address(&depositor, &dividend_mint),
            dividend_vault: get_dividend_vault_address(&program.id()),
            token_program: spl_token::id(),
        })
        .args(staking_instructions::DepositDividends { amount })
        .instructions()?;
    Ok(instructions)
}

pub fn update_config_instr(
    config: &ClientConfig,
    param: u8,
    value: u64,
    new_pubkey: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let mut ixs = program
        .request()
        .accounts(staking_accounts::UpdateConfig {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            system_program: system_program::id(),
        })
        .args(staking_instructions::UpdateConfig { param, value })
        .instructions()?;

    if let Some(key) = new_pubkey {
        ixs[0]
            .accounts
            .push(anchor_lang::prelude::AccountMeta::new_readonly(key, false));
    }

    Ok(ixs)
}

pub fn set_social_bonus_instr(
    config: &ClientConfig,
    holder: Pubkey,
    percent: u16,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let instructions = program
        .request()
        .accounts(staking_accounts::SetSocialBonus {
            owner: program.payer(),
            holder,
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
            staker_account: get_staker_account_address(&holder, &program.id()),
        })
        .args(staking_instructions::SetSocialBonus { percent })
        .instructions()?;
    Ok(instructions)
}

pub fn set_social_bonus_batch_instr(
    config: &ClientConfig,
    holders: &[Pubkey],
    percents: Vec<u16>,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let mut ixs = program
        .request()
        .accounts(staking_accounts::SetSocialBonusBatch {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            period_ledger: fetch_period_ledger(config)?,
        })
        .args(staking_instructions::SetSocialBonusBatch { percents })
        .instructions()?;

    // One writable staker account per entry, in the same order as percents.
    for holder in holders {
        ixs[0].accounts.push(anchor_lang::prelude::AccountMeta::new(
            get_staker_account_address(holder, &program.id()),
            false,
        ));
    }
    Ok(ixs)
}

pub fn wind_down_instr(
    config: &ClientConfig,
    confirmation: String,
    activate: bool,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let request = program.request().accounts(staking_accounts::WindDownSwitch {
        owner: program.payer(),
        global_config: get_global_config_address(&program.id()),
    });
    let instructions = if activate {
        request.args(staking_instructions::ActivateWindDown { confirmation })
    } else {
        request.args(staking_instructions::CancelWindDown { confirmation })
    }
    .instructions()?;
    Ok(instructions)
}

pub fn sweep_custody_instr(
    config: &ClientConfig,
    stake_mint: Pubkey,
    dividend_mint: Pubkey,
    destination: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = staking_program(config, &config.admin_path)?;
    let instructions = program
        .request()
        .accounts(staking_accounts::SweepCustody {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            stake_mint,
            dividend_mint,
            stake_vault: get_stake_vault_address(&program.id()),
            dividend_vault: get_dividend_vault_address(&program.id()),
            destination_stake_token: get_associated_token_address(&destination, &stake_mint),
            destination_dividend_token: get_associated_token_address(&destination, &dividend_mint),
            token_program: spl_token::id(),
        })
        .args(staking_instructions::SweepCustody {})
        .instructions()?;
    Ok(instructions)
}

/// The period ledger is not a PDA (it exceeds CPI allocation limits), so its
/// address lives in the global config and has to be fetched.
pub fn fetch_period_ledger(config: &ClientConfig) -> Result<Pubkey> {
    use crate::instructions::utils::deserialize_anchor_account;
    use solana_client::rpc_client::RpcClient;

    let rpc_client = RpcClient::new(config.http_url.clone());
    let global_config_address = get_global_config_address(&config.staking_program);
    let account = rpc_client.get_account(&global_config_address)?;
    let global_config: commune_staking::states::GlobalConfig =
        deserialize_anchor_account(&account)?;
    Ok(global_config.period_ledger)
}
