#![allow(dead_code)]
use anyhow::{format_err, Result};
use clap::Parser;
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use std::str::FromStr;

mod instructions;
use instructions::staking_instructions::*;

use commune_staking::states::PeriodLedger;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    staking_program: Pubkey,
}

fn load_cfg(client_config: &String) -> Result<ClientConfig> {
    let mut config = Ini::new();
    let _map = config.load(client_config).unwrap();
    let http_url = config.get("Global", "http_url").unwrap();
    if http_url.is_empty() {
        panic!("http_url must not be empty");
    }
    let ws_url = config.get("Global", "ws_url").unwrap();
    if ws_url.is_empty() {
        panic!("ws_url must not be empty");
    }
    let payer_path = config.get("Global", "payer_path").unwrap();
    if payer_path.is_empty() {
        panic!("payer_path must not be empty");
    }
    let admin_path = config.get("Global", "admin_path").unwrap();
    if admin_path.is_empty() {
        panic!("admin_path must not be empty");
    }

    let staking_program_str = config.get("Global", "staking_program").unwrap();
    if staking_program_str.is_empty() {
        panic!("staking_program must not be empty");
    }
    let staking_program = Pubkey::from_str(&staking_program_str).unwrap();

    Ok(ClientConfig {
        http_url,
        ws_url,
        payer_path,
        admin_path,
        staking_program,
    })
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: StakingCommands,
}

#[derive(Debug, Parser)]
pub enum StakingCommands {
    /// Initialize config, state, vaults, and the period ledger.
    InitialiseConfigs {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        dividend_mint: Pubkey,
        #[arg(long)]
        admin: Pubkey,
        #[arg(long)]
        sweep_destination: Pubkey,
        #[arg(long, default_value_t = 50)]
        tier_two_bonus_percent: u16,
        #[arg(long, default_value_t = 100)]
        tier_three_bonus_percent: u16,
    },
    /// Lock principal for one, two or three months.
    Stake {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        amount: u64,
        #[arg(long, default_value_t = 1)]
        duration_tier: u8,
    },
    /// Roll a matured stake into a fresh lock.
    Restake {
        #[arg(long)]
        stake_index: u16,
        #[arg(long)]
        new_tier: u8,
    },
    /// Exit a matured stake, collecting principal and earnings.
    Unstake {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        dividend_mint: Pubkey,
        #[arg(long)]
        stake_index: u16,
    },
    /// Withdraw all accrued earnings without unstaking.
    Withdraw {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        dividend_mint: Pubkey,
    },
    /// Advance one stake's checkpoints within the per-call budget.
    PrecomputeStake {
        #[arg(long)]
        holder: Pubkey,
        #[arg(long)]
        stake_index: u16,
    },
    /// Advance all of a holder's checkpoints within the per-call budget.
    PrecomputeAll {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Read a holder's fully-caught-up dividend earnings.
    ComputeDividends {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Read a holder's fully-caught-up reward earnings.
    ComputeRewards {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Read both streams combined.
    ComputeTotalEarnings {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Read what is payable right now, with no catch-up work.
    ComputeWithdrawable {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Read a holder's total live principal.
    ComputeHolderStake {
        #[arg(long)]
        holder: Pubkey,
    },
    /// Check whether a distribution period could be created now.
    CanCreatePeriod,
    /// Freeze the current surpluses into a new distribution period.
    CreatePeriod,
    /// Deposit stake-asset rewards into custody.
    DepositRewards {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Deposit settlement-asset dividends into custody.
    DepositDividends {
        #[arg(long)]
        dividend_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Admin: update a config parameter by selector.
    UpdateConfig {
        #[arg(long)]
        param: u8,
        #[arg(long, default_value_t = 0)]
        value: u64,
        #[arg(long)]
        new_pubkey: Option<Pubkey>,
    },
    /// Admin: set a holder's eligibility bonus.
    SetSocialBonus {
        #[arg(long)]
        holder: Pubkey,
        #[arg(long)]
        percent: u16,
    },
    /// Admin: set eligibility bonuses for several holders at once.
    SetSocialBonusBatch {
        #[arg(long, value_delimiter = ',')]
        holders: Vec<Pubkey>,
        #[arg(long, value_delimiter = ',')]
        percents: Vec<u16>,
    },
    /// Admin: switch wind-down mode on.
    ActivateWindDown {
        #[arg(long)]
        confirmation: String,
    },
    /// Admin: switch wind-down mode off.
    CancelWindDown {
        #[arg(long)]
        confirmation: String,
    },
    /// Admin: sweep custody after the cooling-off period.
    SweepCustody {
        #[arg(long)]
        stake_mint: Pubkey,
        #[arg(long)]
        dividend_mint: Pubkey,
        #[arg(long)]
        destination: Pubkey,
    },
}

fn send_txn(
    rpc_client: &RpcClient,
    instructions: &[Instruction],
    payer: &Keypair,
    extra_signers: &[&Keypair],
) -> Result<()> {
    let mut signers: Vec<&Keypair> = vec![payer];
    signers.extend_from_slice(extra_signers);
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &signers,
        recent_hash,
    );
    let signature = rpc_client.send_and_confirm_transaction(&txn)?;
    println!("{}", signature);
    Ok(())
}

/// Read views return their value in transaction return data; simulate the
/// transaction and decode the little-endian integer.
fn simulate_view(rpc_client: &RpcClient, instructions: &[Instruction], payer: &Keypair) -> Result<u64> {
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &[payer],
        recent_hash,
    );
    let response = rpc_client.simulate_transaction(&txn)?;
    if let Some(err) = response.value.err {
        return Err(format_err!("simulation failed: {:?}", err));
    }
    let return_data = response
        .value
        .return_data
        .ok_or_else(|| format_err!("no return data"))?;
    let bytes = base64::decode(return_data.data.0)?;
    let mut raw = [0u8; 8];
    raw[..bytes.len().min(8)].copy_from_slice(&bytes[..bytes.len().min(8)]);
    Ok(u64::from_le_bytes(raw))
}

fn main() -> Result<()> {
    let client_config = "client_config.ini";
    let config = load_cfg(&client_config.to_string())?;
    let payer = read_keypair_file(&config.payer_path)?;
    let admin = read_keypair_file(&config.admin_path)?;
    let rpc_client =
        RpcClient::new_with_commitment(config.http_url.clone(), CommitmentConfig::confirmed());

    let opts = Opts::parse();
    match opts.command {
        StakingCommands::InitialiseConfigs {
            stake_mint,
            dividend_mint,
            admin: new_admin,
            sweep_destination,
            tier_two_bonus_percent,
            tier_three_bonus_percent,
        } => {
            // The ledger account is too large for CPI allocation: create it
            // directly, then hand it to the program zeroed.
            let ledger = Keypair::new();
            let rent = rpc_client.get_minimum_balance_for_rent_exemption(PeriodLedger::LEN)?;
            let create_ledger = system_instruction::create_account(
                &admin.pubkey(),
                &ledger.pubkey(),
                rent,
                PeriodLedger::LEN as u64,
                &config.staking_program,
            );
            let mut instructions = vec![create_ledger];
            instructions.extend(initialise_configs_instr(
                &config,
                ledger.pubkey(),
                stake_mint,
                dividend_mint,
                new_admin,
                sweep_destination,
                tier_two_bonus_percent,
                tier_three_bonus_percent,
            )?);
            println!("period_ledger: {}", ledger.pubkey());
            send_txn(&rpc_client, &instructions, &admin, &[&ledger])?;
        }
        StakingCommands::Stake {
            stake_mint,
            amount,
            duration_tier,
        } => {
            let instructions = stake_instr(&config, stake_mint, amount, duration_tier)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::Restake {
            stake_index,
            new_tier,
        } => {
            let instructions = restake_instr(&config, stake_index, new_tier)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::Unstake {
            stake_mint,
            dividend_mint,
            stake_index,
        } => {
            let instructions = unstake_instr(&config, stake_mint, dividend_mint, stake_index)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::Withdraw {
            stake_mint,
            dividend_mint,
        } => {
            let instructions = withdraw_instr(&config, stake_mint, dividend_mint)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::PrecomputeStake {
            holder,
            stake_index,
        } => {
            let instructions = precompute_stake_instr(&config, holder, stake_index)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::PrecomputeAll { holder } => {
            let instructions = precompute_all_instr(&config, holder)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::ComputeDividends { holder } => {
            let instructions = compute_earnings_instr(&config, holder, EarningsView::Dividends)?;
            println!("dividends: {}", simulate_view(&rpc_client, &instructions, &payer)?);
        }
        StakingCommands::ComputeRewards { holder } => {
            let instructions = compute_earnings_instr(&config, holder, EarningsView::Rewards)?;
            println!("rewards: {}", simulate_view(&rpc_client, &instructions, &payer)?);
        }
        StakingCommands::ComputeTotalEarnings { holder } => {
            let instructions =
                compute_earnings_instr(&config, holder, EarningsView::TotalEarnings)?;
            println!("total: {}", simulate_view(&rpc_client, &instructions, &payer)?);
        }
        StakingCommands::ComputeWithdrawable { holder } => {
            let instructions =
                compute_earnings_instr(&config, holder, EarningsView::Withdrawable)?;
            println!(
                "withdrawable: {}",
                simulate_view(&rpc_client, &instructions, &payer)?
            );
        }
        StakingCommands::ComputeHolderStake { holder } => {
            let instructions = compute_earnings_instr(&config, holder, EarningsView::HolderStake)?;
            println!("staked: {}", simulate_view(&rpc_client, &instructions, &payer)?);
        }
        StakingCommands::CanCreatePeriod => {
            let instructions = can_create_period_instr(&config)?;
            let value = simulate_view(&rpc_client, &instructions, &payer)?;
            println!("can_create_period: {}", value != 0);
        }
        StakingCommands::CreatePeriod => {
            let instructions = create_period_instr(&config)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::DepositRewards { stake_mint, amount } => {
            let instructions = deposit_rewards_instr(&config, stake_mint, amount)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::DepositDividends {
            dividend_mint,
            amount,
        } => {
            let instructions = deposit_dividends_instr(&config, dividend_mint, amount)?;
            send_txn(&rpc_client, &instructions, &payer, &[])?;
        }
        StakingCommands::UpdateConfig {
            param,
            value,
            new_pubkey,
        } => {
            let instructions = update_config_instr(&config, param, value, new_pubkey)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
        StakingCommands::SetSocialBonus { holder, percent } => {
            let instructions = set_social_bonus_instr(&config, holder, percent)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
        StakingCommands::SetSocialBonusBatch { holders, percents } => {
            if holders.len() != percents.len() {
                return Err(format_err!("holders and percents must be the same length"));
            }
            let instructions = set_social_bonus_batch_instr(&config, &holders, percents)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
        StakingCommands::ActivateWindDown { confirmation } => {
            let instructions = wind_down_instr(&config, confirmation, true)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
        StakingCommands::CancelWindDown { confirmation } => {
            let instructions = wind_down_instr(&config, confirmation, false)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
        StakingCommands::SweepCustody {
            stake_mint,
            dividend_mint,
            destination,
        } => {
            let instructions =
                sweep_custody_instr(&config, stake_mint, dividend_mint, destination)?;
            send_txn(&rpc_client, &instructions, &admin, &[])?;
        }
    }
    Ok(())
}
