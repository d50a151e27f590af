//! Block subsidy schedule.

/// Subsidy for a block at `height`.
///
/// `initial_reward` is halved (right shift) once every `halving_interval`
/// blocks. After `max_halvings` halvings the subsidy is zero. A zero
/// `halving_interval` never halves.
pub fn block_reward(
    initial_reward: u64,
    halving_interval: u64,
    max_halvings: u64,
    height: u64,
) -> u64 {
    let halvings = height.checked_div(halving_interval).unwrap_or(0);
    if halvings >= max_halvings {
        return 0;
    }
    u32::try_from(halvings)
        .ok()
        .and_then(|shift| initial_reward.checked_shr(shift))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const INITIAL: u64 = 5_000_000_000;
    const INTERVAL: u64 = 210_000;

    #[test]
    fn test_halving_schedule() {
        assert_eq!(block_reward(INITIAL, INTERVAL, 64, 0), INITIAL);
        assert_eq!(block_reward(INITIAL, INTERVAL, 64, INTERVAL - 1), INITIAL);
        assert_eq!(block_reward(INITIAL, INTERVAL, 64, INTERVAL), INITIAL / 2);
        assert_eq!(block_reward(INITIAL, INTERVAL, 64, 2 * INTERVAL), INITIAL / 4);
    }

    #[test]
    fn test_zero_after_max_halvings() {
        assert_eq!(block_reward(INITIAL, INTERVAL, 3, 3 * INTERVAL), 0);
        assert_eq!(block_reward(INITIAL, INTERVAL, 3, 3 * INTERVAL - 1), INITIAL / 4);
        assert_eq!(block_reward(INITIAL, 1, 64, 64), 0);
        assert_eq!(block_reward(u64::MAX, 1, 100, 80), 0);
    }

    proptest! {
        #[test]
        fn prop_reward_halves_each_interval(
            initial in 0u64..=u64::MAX,
            interval in 1u64..1_000_000,
            epoch in 0u64..63,
            offset in 0u64..1_000_000,
        ) {
            let offset = offset % interval;
            let height = epoch * interval + offset;
            let reward = block_reward(initial, interval, 64, height);
            prop_assert_eq!(reward, initial >> epoch);

            let next = block_reward(initial, interval, 64, height + interval);
            prop_assert_eq!(next, reward >> 1);
        }

        #[test]
        fn prop_never_increases(initial in 0u64..=u64::MAX, a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(block_reward(initial, 1000, 64, hi) <= block_reward(initial, 1000, 64, lo));
        }
    }
}
