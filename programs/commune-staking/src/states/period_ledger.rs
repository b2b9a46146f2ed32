use anchor_lang::prelude::*;

use crate::error::ErrorCode;

//
// ──────────────────────────────────────────────────────────────────────────────
// PeriodLedger Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// Maximum number of distribution periods the ledger can ever hold.
pub const MAX_PERIODS: usize = 1024;

/// One frozen distribution event.
///
/// A period captures how much of each stream is being shared and over what
/// total weight. Records are append-only: once written, none of these fields
/// ever change, which is what makes historical replay deterministic no matter
/// who triggers it or in how many increments.
#[zero_copy]
#[derive(Default, Debug)]
pub struct DistributionPeriod {
    /// Dense sequence number, starting at 0.
    pub index: u64,

    /// Dividend-asset surplus distributed by this period (raw units).
    pub new_dividend_amount: u64,

    /// Stake-asset surplus distributed by this period (raw units).
    pub new_reward_amount: u64,

    /// Sum of all live principal when the period was created. Always > 0.
    pub total_stake_at_creation: u64,

    /// Sum of all frozen pondered amounts when the period was created.
    pub total_pondered_stake_at_creation: u128,

    /// Unix timestamp of creation.
    pub timestamp: u64,

    pub padding: u64,
}

/// Append-only sequence of distribution periods.
///
/// Kept zero-copy because the backing array is far too large for borsh
/// (de)serialization inside the compute budget. The account is created
/// directly by the deploy client (it exceeds the CPI allocation limit) and
/// handed to `initialise_configs` zeroed; its address is pinned in
/// `GlobalConfig` afterwards.
#[account(zero_copy)]
pub struct PeriodLedger {
    /// Number of periods written so far; `periods[..period_count]` are live.
    pub period_count: u64,

    pub padding: u64,

    pub periods: [DistributionPeriod; MAX_PERIODS],
}

impl PeriodLedger {
    /// Full serialized size of the account (for direct allocation by the
    /// deploy client): 8-byte discriminator plus the raw struct.
    pub const LEN: usize = 8 + std::mem::size_of::<PeriodLedger>();

    /// The live, chronologically ordered prefix of the backing array.
    pub fn settled(&self) -> &[DistributionPeriod] {
        &self.periods[..self.period_count as usize]
    }

    /// Appends a new period. The caller is responsible for having checked
    /// `total_stake_at_creation > 0` and that at least one amount is set.
    pub fn append(
        &mut self,
        new_dividend_amount: u64,
        new_reward_amount: u64,
        total_stake_at_creation: u64,
        total_pondered_stake_at_creation: u128,
        timestamp: u64,
    ) -> Result<u64> {
        let index = self.period_count;
        require!((index as usize) < MAX_PERIODS, ErrorCode::PeriodLedgerFull);
        self.periods[index as usize] = DistributionPeriod {
            index,
            new_dividend_amount,
            new_reward_amount,
            total_stake_at_creation,
            total_pondered_stake_at_creation,
            timestamp,
            padding: 0,
        };
        self.period_count = index.checked_add(1).ok_or(ErrorCode::MathOverflow)?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeroed_ledger() -> Box<PeriodLedger> {
        Box::new(bytemuck::Zeroable::zeroed())
    }

    #[test]
    fn appends_dense_indices() {
        let mut ledger = zeroed_ledger();
        assert_eq!(ledger.append(10, 0, 100, 100, 1).unwrap(), 0);
        assert_eq!(ledger.append(0, 20, 100, 200, 2).unwrap(), 1);
        assert_eq!(ledger.period_count, 2);
        assert_eq!(ledger.settled()[0].new_dividend_amount, 10);
        assert_eq!(ledger.settled()[1].new_reward_amount, 20);
        assert_eq!(ledger.settled()[1].index, 1);
    }

    #[test]
    fn appended_periods_never_move() {
        let mut ledger = zeroed_ledger();
        ledger.append(7, 9, 55, 110, 42).unwrap();
        let before = ledger.settled()[0];
        ledger.append(1, 2, 55, 110, 43).unwrap();
        let after = ledger.settled()[0];
        assert_eq!(before.new_dividend_amount, after.new_dividend_amount);
        assert_eq!(before.total_stake_at_creation, after.total_stake_at_creation);
        assert_eq!(
            before.total_pondered_stake_at_creation,
            after.total_pondered_stake_at_creation
        );
        assert_eq!(before.timestamp, after.timestamp);
    }

    #[test]
    fn rejects_append_at_capacity() {
        let mut ledger = zeroed_ledger();
        ledger.period_count = MAX_PERIODS as u64;
        assert!(ledger.append(1, 1, 1, 1, 1).is_err());
    }
}
