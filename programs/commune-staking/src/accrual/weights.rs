//! Weight model: maps principal, lock tier and eligibility bonus to the
//! pondered amount used by the reward stream.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;

/// Resolves the configured bonus percentage for a lock tier.
///
/// Tier 1 carries no bonus; tiers 2 and 3 use the admin-configured percents.
pub fn tier_bonus_percent(tier: u8, tier_two: u16, tier_three: u16) -> Result<u16> {
    match tier {
        1 => Ok(0),
        2 => Ok(tier_two),
        3 => Ok(tier_three),
        _ => Err(ErrorCode::InvalidDurationTier.into()),
    }
}

/// The pondered (weighted) amount of a stake:
/// `principal * (100 + tier_bonus + social_bonus) / 100`, floor division.
///
/// Computed in `u128` because the social bonus carries no upper bound.
pub fn pondered_amount(principal: u64, tier_bonus: u16, social_bonus: u16) -> u128 {
    let multiplier = 100u128 + tier_bonus as u128 + social_bonus as u128;
    principal as u128 * multiplier / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_bonus_is_identity() {
        assert_eq!(pondered_amount(1_000_000_000, 0, 0), 1_000_000_000);
    }

    #[test]
    fn bonuses_are_additive() {
        // 50% tier bonus + 100% social bonus => 2.5x weight.
        assert_eq!(pondered_amount(1_000, 50, 100), 2_500);
    }

    #[test]
    fn floor_division_rounds_down() {
        assert_eq!(pondered_amount(3, 50, 0), 4); // 3 * 150 / 100 = 4.5
    }

    #[test]
    fn tier_one_has_no_bonus() {
        assert_eq!(tier_bonus_percent(1, 50, 100).unwrap(), 0);
        assert_eq!(tier_bonus_percent(2, 50, 100).unwrap(), 50);
        assert_eq!(tier_bonus_percent(3, 50, 100).unwrap(), 100);
        assert!(tier_bonus_percent(0, 50, 100).is_err());
        assert!(tier_bonus_percent(4, 50, 100).is_err());
    }

    proptest! {
        #[test]
        fn pure_and_reproducible(principal in 0u64..=u64::MAX, tier in 0u16..=300, social in 0u16..=u16::MAX) {
            let a = pondered_amount(principal, tier, social);
            let b = pondered_amount(principal, tier, social);
            prop_assert_eq!(a, b);
            // Weight never shrinks below the principal and grows with bonus.
            prop_assert!(a >= principal as u128);
            prop_assert!(pondered_amount(principal, tier, social.saturating_add(100)) >= a);
        }
    }
}
