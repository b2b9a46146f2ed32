pub mod events;
pub use events::*;

pub mod global_config;
pub use global_config::*;

pub mod period_ledger;
pub use period_ledger::*;

pub mod staker_account;
pub use staker_account::*;

pub mod staking_state;
pub use staking_state::*;
