//! Lifecycle tests driving the real state types and settlement engine the
//! way the on-chain handlers do, with token transfers reduced to balance
//! arithmetic.

use anchor_lang::error::Error;
use anchor_lang::prelude::Pubkey;

use commune_staking::accrual::{engine, weights};
use commune_staking::error::ErrorCode;
use commune_staking::states::*;
use commune_staking::{
    BASE_UNIT, CATCH_UP_STEP_BUDGET, MAX_STAKE_BASE_UNITS, SECONDS_PER_DAY, WIND_DOWN_CONFIRMATION,
    WIND_DOWN_COOLING_SECONDS,
};

const GENESIS: u64 = 1_700_000_000;

/// One external wallet plus its staker account.
struct Holder {
    staker: StakerAccount,
    stake_balance: u64,
    dividend_balance: u64,
}

impl Holder {
    fn new(stake_balance: u64) -> Self {
        Holder {
            staker: StakerAccount {
                owner: Pubkey::new_unique(),
                ..Default::default()
            },
            stake_balance,
            dividend_balance: 0,
        }
    }
}

/// In-memory stand-in for the deployed program: the same state accounts and
/// engine calls as the handlers, with vault balances as plain integers.
struct Harness {
    config: GlobalConfig,
    state: StakingState,
    ledger: Box<PeriodLedger>,
    stake_vault: u64,
    dividend_vault: u64,
    now: u64,
}

impl Harness {
    fn new(tier_two: u16, tier_three: u16) -> Self {
        Harness {
            config: GlobalConfig {
                tier_two_bonus_percent: tier_two,
                tier_three_bonus_percent: tier_three,
                ..Default::default()
            },
            state: StakingState::default(),
            ledger: Box::new(bytemuck::Zeroable::zeroed()),
            stake_vault: 0,
            dividend_vault: 0,
            now: GENESIS,
        }
    }

    fn days(&mut self, n: u64) {
        self.now += n * SECONDS_PER_DAY;
    }

    fn stake(&mut self, holder: &mut Holder, amount: u64, duration_tier: u8) -> Result<(), Error> {
        if amount == 0 || amount % BASE_UNIT != 0 || amount / BASE_UNIT > MAX_STAKE_BASE_UNITS {
            return Err(ErrorCode::InvalidAmount.into());
        }
        let tier_bonus = weights::tier_bonus_percent(
            duration_tier,
            self.config.tier_two_bonus_percent,
            self.config.tier_three_bonus_percent,
        )?;
        if holder.staker.stakes.len() >= MAX_STAKES_PER_HOLDER {
            return Err(ErrorCode::TooManyStakes.into());
        }
        assert!(holder.stake_balance >= amount, "insufficient wallet balance");

        let pondered_amount =
            weights::pondered_amount(amount, tier_bonus, holder.staker.social_bonus_percent);
        holder.staker.stakes.push(StakeRecord {
            principal: amount,
            duration_tier,
            start_timestamp: self.now,
            last_restake_timestamp: 0,
            pondered_amount,
            dividend_checkpoint: self.ledger.period_count,
            reward_checkpoint: self.ledger.period_count,
            accrued_dividends: 0,
            accrued_rewards: 0,
            withdrawn_total: 0,
        });
        self.state.total_stake += amount;
        self.state.total_owned_principal += amount;
        self.state.total_pondered_stake += pondered_amount;
        holder.stake_balance -= amount;
        self.stake_vault += amount;
        Ok(())
    }

    fn deposit_rewards(&mut self, amount: u64) {
        self.stake_vault += amount;
    }

    fn deposit_dividends(&mut self, amount: u64) {
        self.dividend_vault += amount;
    }

    fn can_create_period(&self) -> bool {
        self.state
            .can_create_period(self.stake_vault, self.dividend_vault)
    }

    fn create_period(&mut self) -> Result<u64, Error> {
        let new_reward_amount = self.state.reward_surplus(self.stake_vault);
        let new_dividend_amount = self.state.dividend_surplus(self.dividend_vault);
        if self.state.total_stake == 0 || (new_reward_amount == 0 && new_dividend_amount == 0) {
            return Err(ErrorCode::NothingToDistribute.into());
        }
        let index = self.ledger.append(
            new_dividend_amount,
            new_reward_amount,
            self.state.total_stake,
            self.state.total_pondered_stake,
            self.now,
        )?;
        self.state.pending_dividends += new_dividend_amount;
        self.state.pending_rewards += new_reward_amount;
        self.state.total_dividends_distributed += new_dividend_amount;
        self.state.total_rewards_distributed += new_reward_amount;
        Ok(index)
    }

    fn refreeze(&mut self, holder: &mut Holder, index: usize) -> Result<(), Error> {
        let social = holder.staker.social_bonus_percent;
        let record = &mut holder.staker.stakes[index];
        let tier_bonus = weights::tier_bonus_percent(
            record.duration_tier,
            self.config.tier_two_bonus_percent,
            self.config.tier_three_bonus_percent,
        )?;
        engine::refreeze_pondered(
            record,
            &mut self.state.total_pondered_stake,
            tier_bonus,
            social,
        )
    }

    fn precompute_stake(&mut self, holder: &mut Holder, index: usize) -> Result<(), Error> {
        let pass = engine::advance_stake(
            &mut holder.staker.stakes[index],
            self.ledger.settled(),
            CATCH_UP_STEP_BUDGET,
        )?;
        if pass.fully_settled {
            self.refreeze(holder, index)?;
        }
        Ok(())
    }

    fn precompute_all(&mut self, holder: &mut Holder) -> Result<(), Error> {
        let mut budget = CATCH_UP_STEP_BUDGET;
        for index in 0..holder.staker.stakes.len() {
            if budget == 0 {
                break;
            }
            let pass = engine::advance_stake(
                &mut holder.staker.stakes[index],
                self.ledger.settled(),
                budget,
            )?;
            budget -= pass.steps_used;
            if pass.fully_settled {
                self.refreeze(holder, index)?;
            }
        }
        Ok(())
    }

    fn project_holder(&self, holder: &Holder) -> Result<(u64, u64), Error> {
        let mut budget = CATCH_UP_STEP_BUDGET;
        let mut dividends = 0u64;
        let mut rewards = 0u64;
        for record in &holder.staker.stakes {
            let projection = engine::project_stake(record, self.ledger.settled(), &mut budget)?;
            dividends += projection.dividends;
            rewards += projection.rewards;
        }
        Ok((dividends, rewards))
    }

    fn compute_dividends(&self, holder: &Holder) -> Result<u64, Error> {
        Ok(self.project_holder(holder)?.0)
    }

    fn compute_rewards(&self, holder: &Holder) -> Result<u64, Error> {
        Ok(self.project_holder(holder)?.1)
    }

    fn maturity_ok(&self, record: &StakeRecord) -> bool {
        self.config.wind_down_active || record.is_matured(self.now)
    }

    fn restake(&mut self, holder: &mut Holder, index: usize, new_tier: u8) -> Result<(), Error> {
        let new_tier_bonus = weights::tier_bonus_percent(
            new_tier,
            self.config.tier_two_bonus_percent,
            self.config.tier_three_bonus_percent,
        )?;
        if index >= holder.staker.stakes.len() {
            return Err(ErrorCode::InvalidStakeIndex.into());
        }
        if !self.maturity_ok(&holder.staker.stakes[index]) {
            return Err(ErrorCode::NotYetMatured.into());
        }
        let social = holder.staker.social_bonus_percent;
        let record = &mut holder.staker.stakes[index];
        engine::strict_settle(record, self.ledger.settled(), CATCH_UP_STEP_BUDGET)?;
        record.duration_tier = new_tier;
        record.start_timestamp = self.now;
        record.last_restake_timestamp = self.now;
        engine::refreeze_pondered(
            record,
            &mut self.state.total_pondered_stake,
            new_tier_bonus,
            social,
        )?;
        Ok(())
    }

    fn unstake(&mut self, holder: &mut Holder, index: usize) -> Result<(u64, u64, u64), Error> {
        if index >= holder.staker.stakes.len() {
            return Err(ErrorCode::InvalidStakeIndex.into());
        }
        if !self.maturity_ok(&holder.staker.stakes[index]) {
            return Err(ErrorCode::NotYetMatured.into());
        }
        engine::strict_settle(
            &mut holder.staker.stakes[index],
            self.ledger.settled(),
            CATCH_UP_STEP_BUDGET,
        )?;
        let record = holder.staker.stakes.swap_remove(index);
        let principal = record.principal;
        let dividends = record.accrued_dividends;
        let rewards = record.accrued_rewards;

        self.state.total_stake -= principal;
        self.state.total_owned_principal -= principal;
        self.state.total_pondered_stake -= record.pondered_amount;
        self.state.pending_dividends -= dividends;
        self.state.pending_rewards -= rewards;
        self.state.total_dividends_paid += dividends;
        self.state.total_rewards_paid += rewards;
        if self.state.total_stake == 0 {
            self.state.pending_dividends = 0;
            self.state.pending_rewards = 0;
        }

        self.stake_vault -= principal + rewards;
        self.dividend_vault -= dividends;
        holder.stake_balance += principal + rewards;
        holder.dividend_balance += dividends;
        Ok((principal, dividends, rewards))
    }

    fn withdraw(&mut self, holder: &mut Holder) -> Result<u64, Error> {
        let outstanding: u64 = holder
            .staker
            .stakes
            .iter()
            .map(|record| engine::outstanding_steps(record, self.ledger.period_count))
            .sum();
        if outstanding > CATCH_UP_STEP_BUDGET {
            return Err(ErrorCode::UnboundedCatchUp.into());
        }
        let mut dividends = 0u64;
        let mut rewards = 0u64;
        for index in 0..holder.staker.stakes.len() {
            engine::strict_settle(
                &mut holder.staker.stakes[index],
                self.ledger.settled(),
                CATCH_UP_STEP_BUDGET,
            )?;
            self.refreeze(holder, index)?;
            let record = &mut holder.staker.stakes[index];
            let payout = record.accrued_dividends + record.accrued_rewards;
            record.withdrawn_total += payout;
            dividends += record.accrued_dividends;
            rewards += record.accrued_rewards;
            record.accrued_dividends = 0;
            record.accrued_rewards = 0;
        }
        self.state.pending_dividends -= dividends;
        self.state.pending_rewards -= rewards;
        self.state.total_dividends_paid += dividends;
        self.state.total_rewards_paid += rewards;

        self.stake_vault -= rewards;
        self.dividend_vault -= dividends;
        holder.stake_balance += rewards;
        holder.dividend_balance += dividends;
        Ok(dividends + rewards)
    }

    fn set_social_bonus(&mut self, holder: &mut Holder, percent: u16) -> Result<(), Error> {
        let outstanding: u64 = holder
            .staker
            .stakes
            .iter()
            .map(|record| engine::outstanding_steps(record, self.ledger.period_count))
            .sum();
        if outstanding > CATCH_UP_STEP_BUDGET {
            return Err(ErrorCode::UnboundedCatchUp.into());
        }
        for record in holder.staker.stakes.iter_mut() {
            engine::strict_settle(record, self.ledger.settled(), CATCH_UP_STEP_BUDGET)?;
        }
        holder.staker.social_bonus_percent = percent;
        for index in 0..holder.staker.stakes.len() {
            self.refreeze(holder, index)?;
        }
        Ok(())
    }

    fn activate_wind_down(&mut self, confirmation: &str) -> Result<(), Error> {
        if confirmation != WIND_DOWN_CONFIRMATION {
            return Err(ErrorCode::InvalidConfirmation.into());
        }
        if self.config.wind_down_active {
            return Err(ErrorCode::WindDownAlreadyActive.into());
        }
        self.config.wind_down_active = true;
        self.config.wind_down_activated_at = self.now;
        Ok(())
    }

    fn cancel_wind_down(&mut self, confirmation: &str) -> Result<(), Error> {
        if confirmation != WIND_DOWN_CONFIRMATION {
            return Err(ErrorCode::InvalidConfirmation.into());
        }
        if !self.config.wind_down_active {
            return Err(ErrorCode::WindDownNotActive.into());
        }
        self.config.wind_down_active = false;
        self.config.wind_down_activated_at = 0;
        Ok(())
    }

    fn sweep_custody(&mut self) -> Result<(u64, u64), Error> {
        if !self.config.wind_down_active {
            return Err(ErrorCode::WindDownNotActive.into());
        }
        if self.now < self.config.wind_down_activated_at + WIND_DOWN_COOLING_SECONDS {
            return Err(ErrorCode::CoolingOffNotElapsed.into());
        }
        let swept = (self.stake_vault, self.dividend_vault);
        self.stake_vault = 0;
        self.dividend_vault = 0;
        Ok(swept)
    }
}

fn base_units(n: u64) -> u64 {
    n * BASE_UNIT
}

fn assert_program_err<T: std::fmt::Debug>(result: Result<T, Error>, expected: ErrorCode) {
    match result {
        Err(err) => {
            let rendered = format!("{err:?}");
            let wanted = format!("{expected:?}");
            assert!(
                rendered.contains(&wanted),
                "expected {wanted}, got {rendered}"
            );
        }
        Ok(value) => panic!("expected {expected:?}, got Ok({value:?})"),
    }
}

#[test]
fn rejects_out_of_bounds_amounts_and_tiers() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(u64::MAX);

    assert_program_err(h.stake(&mut holder, 0, 1), ErrorCode::InvalidAmount);
    assert_program_err(
        h.stake(&mut holder, BASE_UNIT + 1, 1),
        ErrorCode::InvalidAmount,
    );
    assert_program_err(
        h.stake(&mut holder, (MAX_STAKE_BASE_UNITS + 1) * BASE_UNIT, 1),
        ErrorCode::InvalidAmount,
    );
    assert_program_err(
        h.stake(&mut holder, BASE_UNIT, 0),
        ErrorCode::InvalidDurationTier,
    );
    assert_program_err(
        h.stake(&mut holder, BASE_UNIT, 4),
        ErrorCode::InvalidDurationTier,
    );

    // Exactly 2^32 - 1 base units is the largest accepted stake.
    let mut whale = Holder::new(MAX_STAKE_BASE_UNITS * BASE_UNIT);
    h.stake(&mut whale, MAX_STAKE_BASE_UNITS * BASE_UNIT, 1)
        .unwrap();
    assert_eq!(h.state.total_stake, MAX_STAKE_BASE_UNITS * BASE_UNIT);
}

#[test]
fn no_period_without_stakers_or_surplus() {
    let mut h = Harness::new(50, 100);
    h.deposit_dividends(1_000);
    assert!(!h.can_create_period());
    assert_program_err(h.create_period(), ErrorCode::NothingToDistribute);

    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 1).unwrap();
    assert!(h.can_create_period());
    h.create_period().unwrap();

    // Surplus was consumed; nothing new to snapshot.
    assert!(!h.can_create_period());
    assert_program_err(h.create_period(), ErrorCode::NothingToDistribute);
}

#[test]
fn splits_dividends_evenly_between_equal_stakes() {
    let mut h = Harness::new(50, 100);
    let mut a = Holder::new(base_units(1_000_000_000));
    let mut b = Holder::new(base_units(1_000_000_000));
    h.stake(&mut a, base_units(1_000_000_000), 1).unwrap();
    h.stake(&mut b, base_units(1_000_000_000), 1).unwrap();

    h.deposit_dividends(1_000_000_000);
    h.days(2);
    h.create_period().unwrap();

    assert_eq!(h.compute_dividends(&a).unwrap(), 500_000_000);
    assert_eq!(h.compute_dividends(&b).unwrap(), 500_000_000);
    assert_eq!(h.compute_rewards(&a).unwrap(), 0);
}

#[test]
fn reward_stream_splits_two_to_one_for_full_tier_bonus() {
    let mut h = Harness::new(50, 100);
    let mut three_month = Holder::new(base_units(1_000));
    let mut one_month = Holder::new(base_units(1_000));
    h.stake(&mut three_month, base_units(1_000), 3).unwrap();
    h.stake(&mut one_month, base_units(1_000), 1).unwrap();

    h.deposit_rewards(3_000_000_000);
    h.days(2);
    h.create_period().unwrap();

    assert_eq!(h.compute_rewards(&three_month).unwrap(), 2_000_000_000);
    assert_eq!(h.compute_rewards(&one_month).unwrap(), 1_000_000_000);
    // Dividend stream ignores the bonus: no deposit, no dividends.
    assert_eq!(h.compute_dividends(&three_month).unwrap(), 0);
}

#[test]
fn stakes_created_after_a_period_owe_nothing_for_it() {
    let mut h = Harness::new(50, 100);
    let mut early = Holder::new(base_units(100));
    h.stake(&mut early, base_units(100), 1).unwrap();

    h.deposit_dividends(5_000);
    h.create_period().unwrap();

    let mut late = Holder::new(base_units(100));
    h.stake(&mut late, base_units(100), 1).unwrap();

    assert_eq!(h.compute_dividends(&early).unwrap(), 5_000);
    assert_eq!(h.compute_dividends(&late).unwrap(), 0);
}

#[test]
fn maturity_gates_unstake_and_restake() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 1).unwrap();

    h.days(29);
    assert_program_err(h.unstake(&mut holder, 0), ErrorCode::NotYetMatured);
    assert_program_err(h.restake(&mut holder, 0, 2), ErrorCode::NotYetMatured);

    h.days(2); // day 31 > 30-day lock
    let (principal, dividends, rewards) = h.unstake(&mut holder, 0).unwrap();
    assert_eq!(principal, base_units(10));
    assert_eq!(dividends, 0);
    assert_eq!(rewards, 0);
    assert_eq!(holder.stake_balance, base_units(10));
    assert_eq!(h.state.total_stake, 0);
}

#[test]
fn unstake_pays_principal_plus_accrued_earnings() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 1).unwrap();

    h.deposit_dividends(700);
    h.deposit_rewards(900);
    h.create_period().unwrap();

    h.days(31);
    let (principal, dividends, rewards) = h.unstake(&mut holder, 0).unwrap();
    assert_eq!(principal, base_units(10));
    assert_eq!(dividends, 700);
    assert_eq!(rewards, 900);
    assert_eq!(holder.stake_balance, base_units(10) + 900);
    assert_eq!(holder.dividend_balance, 700);
}

#[test]
fn restake_resets_lock_and_reweights_going_forward() {
    let mut h = Harness::new(50, 100);
    let mut a = Holder::new(base_units(100));
    let mut b = Holder::new(base_units(100));
    h.stake(&mut a, base_units(100), 1).unwrap();
    h.stake(&mut b, base_units(100), 1).unwrap();

    h.deposit_rewards(2_000);
    h.create_period().unwrap();

    h.days(31);
    h.restake(&mut a, 0, 3).unwrap();

    // The period that predates the restake was settled at the old weight.
    assert_eq!(a.staker.stakes[0].accrued_rewards, 1_000);
    assert_eq!(a.staker.stakes[0].duration_tier, 3);
    assert_eq!(a.staker.stakes[0].start_timestamp, h.now);

    // A fresh lock is again bound by its (new) maturity.
    assert_program_err(h.unstake(&mut a, 0), ErrorCode::NotYetMatured);

    // The next period splits 2:1 thanks to the 100% three-month bonus.
    h.deposit_rewards(3_000);
    h.create_period().unwrap();
    assert_eq!(h.compute_rewards(&a).unwrap(), 1_000 + 2_000);
    assert_eq!(h.compute_rewards(&b).unwrap(), 1_000 + 1_000);
}

#[test]
fn withdrawal_is_idempotent_between_periods() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 1).unwrap();

    h.deposit_dividends(1_234);
    h.deposit_rewards(5_678);
    h.create_period().unwrap();

    assert_eq!(h.withdraw(&mut holder).unwrap(), 1_234 + 5_678);
    assert_eq!(holder.dividend_balance, 1_234);
    assert_eq!(holder.stake_balance, 5_678);

    // Nothing new distributed: the second call pays zero and moves nothing.
    let balances = (holder.stake_balance, holder.dividend_balance);
    assert_eq!(h.withdraw(&mut holder).unwrap(), 0);
    assert_eq!((holder.stake_balance, holder.dividend_balance), balances);
    assert_eq!(holder.staker.stakes[0].withdrawn_total, 1_234 + 5_678);
}

#[test]
fn deep_backlog_requires_precompute_before_compute() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 1).unwrap();

    // 30 periods x 2 streams = 60 outstanding steps, beyond the 50-step
    // budget of a single call.
    for _ in 0..30 {
        h.deposit_rewards(1_000);
        h.days(2);
        h.create_period().unwrap();
    }
    assert_program_err(h.compute_rewards(&holder), ErrorCode::UnboundedCatchUp);
    assert_program_err(h.withdraw(&mut holder), ErrorCode::UnboundedCatchUp);

    // One bounded precompute absorbs 50 steps; the remainder now fits the
    // read budget and the value matches a full catch-up.
    h.precompute_all(&mut holder).unwrap();
    assert_eq!(h.compute_rewards(&holder).unwrap(), 30_000);
    assert_eq!(h.withdraw(&mut holder).unwrap(), 30_000);
}

#[test]
fn precompute_by_stake_index_converges_too() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(200));
    for _ in 0..4 {
        h.stake(&mut holder, base_units(50), 1).unwrap();
    }
    for _ in 0..20 {
        h.deposit_dividends(4_000);
        h.create_period().unwrap();
    }
    // 4 records x 20 periods x 2 streams = 160 steps in total.
    assert_program_err(h.compute_dividends(&holder), ErrorCode::UnboundedCatchUp);

    for index in 0..4 {
        h.precompute_stake(&mut holder, index).unwrap();
    }
    assert_eq!(h.compute_dividends(&holder).unwrap(), 20 * 4_000);

    // Idempotent: nothing left to process, same answer.
    h.precompute_all(&mut holder).unwrap();
    assert_eq!(h.compute_dividends(&holder).unwrap(), 20 * 4_000);
}

#[test]
fn social_bonus_changes_never_rewrite_settled_periods() {
    let mut h = Harness::new(50, 100);
    let mut a = Holder::new(base_units(100));
    let mut b = Holder::new(base_units(100));
    h.stake(&mut a, base_units(100), 1).unwrap();
    h.stake(&mut b, base_units(100), 1).unwrap();

    h.set_social_bonus(&mut a, 100).unwrap();
    h.deposit_rewards(3_000_000);
    h.create_period().unwrap();

    // Bonus dropped after the period: the setter settles first, so the
    // already-created period still pays 2:1.
    h.set_social_bonus(&mut a, 0).unwrap();
    assert_eq!(h.compute_rewards(&a).unwrap(), 2_000_000);
    assert_eq!(h.compute_rewards(&b).unwrap(), 1_000_000);

    // The next period distributes at the restored equal weights.
    h.deposit_rewards(1_000_000);
    h.create_period().unwrap();
    assert_eq!(h.compute_rewards(&a).unwrap(), 2_000_000 + 500_000);
    assert_eq!(h.compute_rewards(&b).unwrap(), 1_000_000 + 500_000);
}

#[test]
fn conservation_holds_across_mixed_operations() {
    let mut h = Harness::new(50, 100);
    let mut a = Holder::new(base_units(300));
    let mut b = Holder::new(base_units(500));
    h.stake(&mut a, base_units(300), 2).unwrap();
    h.stake(&mut b, base_units(200), 1).unwrap();
    h.stake(&mut b, base_units(300), 3).unwrap();

    let mut dividends_in = 0u64;
    let mut rewards_in = 0u64;
    for round in 1..=7u64 {
        let dividend = round * 1_003;
        let reward = round * 997;
        h.deposit_dividends(dividend);
        h.deposit_rewards(reward);
        dividends_in += dividend;
        rewards_in += reward;
        h.days(10);
        h.create_period().unwrap();
        if round == 4 {
            h.withdraw(&mut a).unwrap();
        }
    }
    h.days(100);
    h.withdraw(&mut a).unwrap();
    h.withdraw(&mut b).unwrap();
    h.unstake(&mut b, 0).unwrap();

    let dividends_out = a.dividend_balance + b.dividend_balance;
    // Wallets held only rewards after staking everything, except the one
    // principal b just got back.
    let rewards_out = a.stake_balance + b.stake_balance - base_units(200);
    assert!(dividends_out <= dividends_in);
    assert!(rewards_out <= rewards_in);
    assert_eq!(h.state.total_dividends_paid, dividends_out);
    assert_eq!(h.state.total_rewards_paid, rewards_out);

    // Aggregate invariants hold after every kind of operation.
    let live_principal: u64 = a.staker.total_principal() + b.staker.total_principal();
    assert_eq!(h.state.total_stake, live_principal);
    let live_pondered: u128 = a
        .staker
        .stakes
        .iter()
        .chain(b.staker.stakes.iter())
        .map(|r| r.pondered_amount)
        .sum();
    assert_eq!(h.state.total_pondered_stake, live_pondered);
}

#[test]
fn emptying_the_pool_folds_reserve_dust_back_into_surplus() {
    let mut h = Harness::new(50, 100);
    let mut a = Holder::new(base_units(1));
    let mut b = Holder::new(base_units(1));
    let mut c = Holder::new(base_units(1));
    h.stake(&mut a, base_units(1), 1).unwrap();
    h.stake(&mut b, base_units(1), 1).unwrap();
    h.stake(&mut c, base_units(1), 1).unwrap();

    // 100 raw units across three equal stakes: 33 each, 1 unit of dust.
    h.deposit_dividends(100);
    h.create_period().unwrap();

    h.days(31);
    h.unstake(&mut a, 0).unwrap();
    h.unstake(&mut b, 0).unwrap();
    h.unstake(&mut c, 0).unwrap();
    assert_eq!(a.dividend_balance, 33);
    assert_eq!(h.state.total_stake, 0);
    assert_eq!(h.state.pending_dividends, 0);

    // The stranded unit is surplus again: a new staker's next period
    // redistributes it rather than losing it.
    assert_eq!(h.dividend_vault, 1);
    let mut d = Holder::new(base_units(1));
    h.stake(&mut d, base_units(1), 1).unwrap();
    assert!(h.can_create_period());
    h.create_period().unwrap();
    assert_eq!(h.compute_dividends(&d).unwrap(), 1);
}

#[test]
fn wind_down_requires_exact_confirmation() {
    let mut h = Harness::new(50, 100);
    assert_program_err(
        h.activate_wind_down("decommission commune staking"),
        ErrorCode::InvalidConfirmation,
    );
    h.activate_wind_down(WIND_DOWN_CONFIRMATION).unwrap();
    assert_program_err(
        h.activate_wind_down(WIND_DOWN_CONFIRMATION),
        ErrorCode::WindDownAlreadyActive,
    );
    assert_program_err(
        h.cancel_wind_down("DECOMMISSION"),
        ErrorCode::InvalidConfirmation,
    );
    h.cancel_wind_down(WIND_DOWN_CONFIRMATION).unwrap();
    assert_program_err(
        h.cancel_wind_down(WIND_DOWN_CONFIRMATION),
        ErrorCode::WindDownNotActive,
    );
}

#[test]
fn wind_down_waives_maturity_and_gates_the_sweep() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 3).unwrap();

    h.days(1);
    assert_program_err(h.unstake(&mut holder, 0), ErrorCode::NotYetMatured);

    h.activate_wind_down(WIND_DOWN_CONFIRMATION).unwrap();
    // Lock waived: immediate exit allowed mid-lock.
    let (principal, _, _) = h.unstake(&mut holder, 0).unwrap();
    assert_eq!(principal, base_units(10));

    // The sweep stays locked through the cooling-off window.
    assert_program_err(h.sweep_custody(), ErrorCode::CoolingOffNotElapsed);
    h.days(119);
    assert_program_err(h.sweep_custody(), ErrorCode::CoolingOffNotElapsed);

    h.days(2);
    h.deposit_rewards(777);
    let (stake_swept, dividends_swept) = h.sweep_custody().unwrap();
    assert_eq!(stake_swept, 777);
    assert_eq!(dividends_swept, 0);
}

#[test]
fn canceling_wind_down_blocks_the_sweep_and_restores_locks() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(10));
    h.stake(&mut holder, base_units(10), 2).unwrap();

    h.activate_wind_down(WIND_DOWN_CONFIRMATION).unwrap();
    h.days(121);
    h.cancel_wind_down(WIND_DOWN_CONFIRMATION).unwrap();

    assert_program_err(h.sweep_custody(), ErrorCode::WindDownNotActive);
    // Maturity applies again (the 60-day lock has elapsed by now though).
    let mut fresh = Holder::new(base_units(5));
    h.stake(&mut fresh, base_units(5), 1).unwrap();
    assert_program_err(h.unstake(&mut fresh, 0), ErrorCode::NotYetMatured);
}

#[test]
fn swap_remove_reuses_the_freed_slot() {
    let mut h = Harness::new(50, 100);
    let mut holder = Holder::new(base_units(60));
    h.stake(&mut holder, base_units(10), 1).unwrap();
    h.stake(&mut holder, base_units(20), 1).unwrap();
    h.stake(&mut holder, base_units(30), 1).unwrap();

    h.days(31);
    h.unstake(&mut holder, 0).unwrap();

    // The last record moved into slot 0; indices are not stable.
    assert_eq!(holder.staker.stakes.len(), 2);
    assert_eq!(holder.staker.stakes[0].principal, base_units(30));
    assert_eq!(holder.staker.total_principal(), base_units(50));
    assert_eq!(h.state.total_stake, base_units(50));
}
