pub mod staking_instructions;
pub mod utils;
