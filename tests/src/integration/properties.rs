//! # Property Tests
//!
//! Quorum arithmetic and nonce-stream monotonicity over arbitrary inputs.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use qc_18_peggy::domain::{NonceCursor, NoncePosition};
    use qc_18_peggy::{FutureNoncePolicy, NonceStream, Threshold};

    fn threshold() -> impl Strategy<Value = Threshold> {
        (1u64..1_000).prop_flat_map(|denominator| {
            (denominator / 2 + 1..=denominator).prop_map(move |numerator| Threshold {
                numerator,
                denominator,
            })
        })
    }

    proptest! {
        #[test]
        fn required_power_is_the_ceiling(t in threshold(), total in 1u64..u64::MAX / 2) {
            let required = u128::from(t.required_power(total));
            let needed = u128::from(total) * u128::from(t.numerator);
            let den = u128::from(t.denominator);
            prop_assert!(required * den >= needed);
            prop_assert!((required - 1) * den < needed);
        }

        #[test]
        fn required_power_is_monotonic(t in threshold(), a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.required_power(low) <= t.required_power(high));
            prop_assert!(t.required_power(low) >= 1);
        }

        #[test]
        fn disjoint_sets_never_both_reach_quorum(
            t in threshold(),
            total in 1u64..1_000_000,
            split in 0.0f64..=1.0,
        ) {
            let a = (total as f64 * split) as u64;
            let b = total - a;
            prop_assert!(!(t.is_met(a, total) && t.is_met(b, total)));
        }

        #[test]
        fn nonce_cursor_only_moves_forward_by_one(attempts in proptest::collection::vec(0u64..20, 0..100)) {
            let mut cursor = NonceCursor::new(NonceStream::Event);
            for nonce in attempts {
                let before = cursor.last;
                let result = cursor.advance(nonce);
                prop_assert_eq!(result.is_ok(), nonce == before + 1);
                prop_assert!(cursor.last == before || cursor.last == before + 1);
            }
        }

        #[test]
        fn classify_partitions_the_nonce_line(last in 0u64..1_000, nonce in 0u64..2_000, gap in 0u64..100) {
            let mut cursor = NonceCursor::new(NonceStream::Batch("uumee".into()));
            cursor.last = last;

            let buffered = cursor.classify(nonce, FutureNoncePolicy::Buffer, gap);
            let rejected = cursor.classify(nonce, FutureNoncePolicy::Reject, gap);
            if nonce <= last {
                prop_assert_eq!(buffered.unwrap(), NoncePosition::Past);
                prop_assert_eq!(rejected.unwrap(), NoncePosition::Past);
            } else if nonce == last + 1 {
                prop_assert_eq!(buffered.unwrap(), NoncePosition::Next);
                prop_assert_eq!(rejected.unwrap(), NoncePosition::Next);
            } else {
                prop_assert!(rejected.is_err());
                prop_assert_eq!(buffered.is_ok(), nonce - (last + 1) <= gap);
            }
        }
    }
}
