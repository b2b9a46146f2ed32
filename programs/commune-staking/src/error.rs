use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Not approved")]
    NotApproved,

    #[msg("Input account owner is not the program address")]
    InvalidOwner,

    #[msg("Stake amount must be a whole number of base units within bounds")]
    InvalidAmount,

    #[msg("Duration tier must be 1, 2 or 3 months")]
    InvalidDurationTier,

    #[msg("No stake record exists at the given index")]
    InvalidStakeIndex,

    #[msg("The holder already has the maximum number of stake records")]
    TooManyStakes,

    #[msg("Tier bonus percentage exceeds its cap")]
    BonusTooHigh,

    #[msg("The stake has not reached its lock maturity")]
    NotYetMatured,

    #[msg("Catch-up distance exceeds the per-call budget; precompute first")]
    UnboundedCatchUp,

    #[msg("No stakers or no fresh surplus to distribute")]
    NothingToDistribute,

    #[msg("The period ledger has reached its capacity")]
    PeriodLedgerFull,

    #[msg("Confirmation string does not match")]
    InvalidConfirmation,

    #[msg("Wind-down is not active")]
    WindDownNotActive,

    #[msg("Wind-down is already active")]
    WindDownAlreadyActive,

    #[msg("The wind-down cooling-off period has not elapsed")]
    CoolingOffNotElapsed,

    #[msg("Math operation overflowed or underflowed")]
    MathOverflow,

    #[msg("Invalid mint account")]
    InvalidMint,

    #[msg("Invalid vault account")]
    InvalidVault,

    #[msg("Insufficient vault balance for the operation")]
    InsufficientVault,

    #[msg("Invalid parameter provided")]
    InvalidParam,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,
}
