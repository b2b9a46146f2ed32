pub mod initialise_configs;
pub use initialise_configs::*;

pub mod stake;
pub use stake::*;

pub mod restake;
pub use restake::*;

pub mod unstake;
pub use unstake::*;

pub mod withdraw;
pub use withdraw::*;

pub mod precompute;
pub use precompute::*;

pub mod compute;
pub use compute::*;

pub mod create_period;
pub use create_period::*;

pub mod deposit;
pub use deposit::*;

pub mod update_configs;
pub use update_configs::*;

pub mod set_social_bonus;
pub use set_social_bonus::*;

pub mod wind_down;
pub use wind_down::*;
