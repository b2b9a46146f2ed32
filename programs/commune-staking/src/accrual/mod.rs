//! Pure accrual math: the weight model and the bounded settlement engine.

pub mod engine;
pub use engine::*;

pub mod weights;
pub use weights::*;
