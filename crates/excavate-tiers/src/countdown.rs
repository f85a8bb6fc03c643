//! Per-tier countdown evaluation

use excavate_core::{InterpolatedState, IMMINENT_THRESHOLD};

use crate::{Tier, TierRule, TIERS};

/// Slots remaining until `tier` unlocks, or `None` for an undisclosed rule
pub fn countdown(tier: &Tier, estimated_slot: f64, estimated_epoch_remaining: f64) -> Option<f64> {
    match tier.rule {
        TierRule::Fixed(value) => Some(value as f64),
        TierRule::PowerOfTwo(k) => {
            let period = 1i64 << k.min(TierRule::MAX_POWER);
            // Floor first so a fractional slot never flickers across a boundary
            let slot = estimated_slot.floor() as i64;
            Some((period - slot.rem_euclid(period)) as f64)
        }
        TierRule::EpochBoundary => Some(estimated_epoch_remaining.max(0.0)),
        TierRule::Mystery => None,
    }
}

/// Whether a countdown is close enough to warrant emphasis
#[inline]
pub fn is_imminent(raw: Option<f64>, threshold: f64) -> bool {
    matches!(raw, Some(v) if v > 0.0 && v <= threshold)
}

/// Countdown of a single tier at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierCountdown {
    pub tier: &'static Tier,
    pub raw: Option<f64>,
    pub imminent: bool,
}

/// Evaluate every tier in the table against an interpolated state
pub fn evaluate_all(state: &InterpolatedState, threshold: f64) -> Vec<TierCountdown> {
    TIERS
        .iter()
        .map(|tier| {
            let raw = countdown(tier, state.estimated_slot, state.estimated_epoch_remaining);
            TierCountdown {
                tier,
                raw,
                imminent: is_imminent(raw, threshold),
            }
        })
        .collect()
}

/// Evaluate with the default imminent threshold
pub fn evaluate_default(state: &InterpolatedState) -> Vec<TierCountdown> {
    evaluate_all(state, IMMINENT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier_by_name;
    use proptest::prelude::*;

    fn pow2(k: u32) -> Tier {
        Tier::new("test", "test", TierRule::PowerOfTwo(k))
    }

    #[test]
    fn test_fixed() {
        let stone = tier_by_name("Stone").unwrap();
        assert_eq!(countdown(stone, 12345.6, -4.0), Some(1.0));
    }

    #[test]
    fn test_power_of_two_end_to_end() {
        let jade = tier_by_name("Jade").unwrap();
        let raw = countdown(jade, 1026.0, 498.0);

        assert_eq!(raw, Some(1022.0));
        assert!(!is_imminent(raw, IMMINENT_THRESHOLD));
    }

    #[test]
    fn test_power_of_two_floors_fractional_slot() {
        let tier = pow2(10);
        assert_eq!(countdown(&tier, 1023.999, 0.0), Some(1.0));
        assert_eq!(countdown(&tier, 1024.0, 0.0), Some(1024.0));
        assert_eq!(countdown(&tier, 1024.7, 0.0), Some(1024.0));
        assert_eq!(countdown(&tier, 1025.2, 0.0), Some(1023.0));
    }

    #[test]
    fn test_epoch_clamps() {
        let bronze = tier_by_name("Bronze").unwrap();
        assert_eq!(countdown(bronze, 0.0, 321.5), Some(321.5));
        assert_eq!(countdown(bronze, 0.0, -12.0), Some(0.0));
        assert_eq!(countdown(bronze, 0.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_mystery() {
        let necrotic = tier_by_name("Necrotic").unwrap();
        assert_eq!(countdown(necrotic, 1024.0, 10.0), None);
        assert!(!is_imminent(None, IMMINENT_THRESHOLD));
    }

    #[test]
    fn test_imminent_bounds() {
        assert!(!is_imminent(Some(0.0), 100.0));
        assert!(is_imminent(Some(0.5), 100.0));
        assert!(is_imminent(Some(100.0), 100.0));
        assert!(!is_imminent(Some(100.01), 100.0));
    }

    #[test]
    fn test_evaluate_all_covers_table() {
        let state = InterpolatedState {
            estimated_slot: 1_048_570.0,
            estimated_epoch_remaining: 80.0,
        };
        let all = evaluate_default(&state);

        assert_eq!(all.len(), TIERS.len());
        let by_name = |name: &str| all.iter().find(|c| c.tier.name == name).unwrap();

        // Stone is always 1 slot away, which counts as imminent
        assert!(by_name("Stone").imminent);
        assert_eq!(by_name("Silver").raw, Some(6.0));
        assert!(by_name("Silver").imminent);
        assert!(by_name("Bronze").imminent);
        assert_eq!(by_name("Necrotic").raw, None);
    }

    proptest! {
        #[test]
        fn prop_power_of_two_periodic(
            k in 0u32..27,
            slot in 0u64..(1u64 << 40),
            frac in 0.0f64..0.999,
        ) {
            let tier = pow2(k);
            let period = (1u64 << k) as f64;
            let s = slot as f64 + frac;

            let a = countdown(&tier, s, 0.0).unwrap();
            let b = countdown(&tier, s + period, 0.0).unwrap();

            prop_assert_eq!(a, b);
            prop_assert!(a >= 1.0 && a <= period);
        }

        #[test]
        fn prop_power_of_two_full_period_at_boundary(
            k in 0u32..27,
            multiple in 0u64..(1u64 << 13),
            frac in 0.0f64..0.999,
        ) {
            let tier = pow2(k);
            let period = 1u64 << k;
            let boundary = (multiple * period) as f64;

            prop_assert_eq!(countdown(&tier, boundary + frac, 0.0), Some(period as f64));
            if boundary >= 1.0 {
                prop_assert_eq!(countdown(&tier, boundary - 1.0 + frac, 0.0), Some(1.0));
            }
        }

        #[test]
        fn prop_epoch_never_negative(remaining in -1.0e9f64..1.0e9) {
            let raw = countdown(&Tier::new("e", "e", TierRule::EpochBoundary), 0.0, remaining).unwrap();
            prop_assert!(raw >= 0.0);
            if remaining < 0.0 {
                prop_assert_eq!(raw, 0.0);
            } else {
                prop_assert_eq!(raw, remaining);
            }
        }

        #[test]
        fn prop_mystery_always_none(slot in -1.0e12f64..1.0e12, remaining in -1.0e9f64..1.0e9) {
            let tier = Tier::new("m", "m", TierRule::Mystery);
            prop_assert_eq!(countdown(&tier, slot, remaining), None);
        }
    }
}
