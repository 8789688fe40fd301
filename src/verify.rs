//! Deterministic verifiers: exact answers for each supported algorithm family.
//!
//! All functions are pure and total over their documented domain.

use std::collections::{HashMap, HashSet};

/// Maximum subarray sum (Kadane). An empty sequence yields 0.
///
/// For non-empty input at least one element is taken, so an all-negative
/// sequence yields its least-negative element.
pub fn max_subarray_sum(seq: &[i64]) -> i64 {
    let Some((&first, rest)) = seq.split_first() else {
        return 0;
    };
    let mut best_ending_here = first;
    let mut best_overall = first;
    for &x in rest {
        best_ending_here = x.max(best_ending_here.saturating_add(x));
        best_overall = best_overall.max(best_ending_here);
    }
    best_overall
}

/// Majority element (count > len / 2) via Boyer–Moore voting plus a verification pass.
pub fn majority_element(seq: &[i64]) -> Option<i64> {
    let mut candidate: Option<i64> = None;
    let mut count = 0usize;
    for &x in seq {
        if count == 0 {
            candidate = Some(x);
            count = 1;
        } else if candidate == Some(x) {
            count += 1;
        } else {
            count -= 1;
        }
    }

    // The vote only yields a candidate; confirm it.
    let candidate = candidate?;
    let occurrences = seq.iter().filter(|&&x| x == candidate).count();
    (occurrences > seq.len() / 2).then_some(candidate)
}

/// Length of the longest run of consecutive integers present in `seq`.
pub fn longest_consecutive_run(seq: &[i64]) -> usize {
    let values: HashSet<i64> = seq.iter().copied().collect();
    let mut best = 0;
    for &n in &values {
        // Only walk from run starts.
        if n.checked_sub(1).is_some_and(|prev| values.contains(&prev)) {
            continue;
        }
        let mut len = 1;
        let mut cur = n;
        while let Some(next) = cur.checked_add(1).filter(|v| values.contains(v)) {
            cur = next;
            len += 1;
        }
        best = best.max(len);
    }
    best
}

/// Number of contiguous subarrays whose XOR equals `target` (prefix-XOR counting).
pub fn count_subarrays_xor(seq: &[i64], target: i64) -> u64 {
    let mut freq: HashMap<i64, u64> = HashMap::from([(0, 1)]);
    let mut xr = 0i64;
    let mut count = 0u64;
    for &x in seq {
        xr ^= x;
        count += freq.get(&(xr ^ target)).copied().unwrap_or(0);
        *freq.entry(xr).or_insert(0) += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn max_subarray_mixed_signs() {
        assert_eq!(max_subarray_sum(&[2, 3, -8, 7, -1, 2, 3]), 11);
        assert_eq!(max_subarray_sum(&[1, -2, 3, 5, -1, 2]), 9);
    }

    #[test]
    fn max_subarray_empty_is_zero() {
        assert_eq!(max_subarray_sum(&[]), 0);
    }

    #[test]
    fn max_subarray_all_negative_picks_least_negative() {
        assert_eq!(max_subarray_sum(&[-5, -2, -9]), -2);
        assert_eq!(max_subarray_sum(&[-7]), -7);
    }

    #[test]
    fn majority_found() {
        assert_eq!(majority_element(&[2, 2, 1, 1, 1, 2, 2]), Some(2));
        assert_eq!(majority_element(&[3, 3, 4, 2, 4, 4, 2, 4, 4]), Some(4));
    }

    #[test]
    fn majority_absent() {
        assert_eq!(majority_element(&[1, 2, 3]), None);
        // Exactly half is not a majority.
        assert_eq!(majority_element(&[1, 1, 2, 2]), None);
        assert_eq!(majority_element(&[]), None);
    }

    #[test]
    fn majority_vote_candidate_is_verified() {
        // Voting leaves 3 as the candidate, but it appears once.
        assert_eq!(majority_element(&[1, 1, 2, 2, 3]), None);
    }

    #[test]
    fn longest_run_examples() {
        assert_eq!(longest_consecutive_run(&[100, 4, 200, 1, 3, 2]), 4);
        assert_eq!(longest_consecutive_run(&[0, -1, -2, 5]), 3);
        assert_eq!(longest_consecutive_run(&[7, 7, 7]), 1);
        assert_eq!(longest_consecutive_run(&[]), 0);
    }

    #[test]
    fn longest_run_at_integer_bounds() {
        assert_eq!(longest_consecutive_run(&[i64::MAX, i64::MAX - 1]), 2);
        assert_eq!(longest_consecutive_run(&[i64::MIN, i64::MIN + 1]), 2);
    }

    #[test]
    fn xor_count_examples() {
        assert_eq!(count_subarrays_xor(&[4, 2, 2, 6, 4], 6), 4);
        assert_eq!(count_subarrays_xor(&[5, 6, 7, 8, 9], 5), 2);
        assert_eq!(count_subarrays_xor(&[0, 0], 0), 3);
        assert_eq!(count_subarrays_xor(&[-1, -1], 0), 1);
    }

    fn brute_force_xor_count(seq: &[i64], target: i64) -> u64 {
        let mut count = 0;
        for i in 0..seq.len() {
            let mut acc = 0;
            for &x in &seq[i..] {
                acc ^= x;
                if acc == target {
                    count += 1;
                }
            }
        }
        count
    }

    fn brute_force_majority(seq: &[i64]) -> Option<i64> {
        seq.iter()
            .copied()
            .find(|v| seq.iter().filter(|&&x| x == *v).count() > seq.len() / 2)
    }

    proptest! {
        #[test]
        fn max_subarray_bounds_every_element(seq in prop::collection::vec(-1000i64..1000, 1..40)) {
            let best = max_subarray_sum(&seq);
            for &x in &seq {
                prop_assert!(best >= x);
            }
        }

        #[test]
        fn majority_matches_definition(seq in prop::collection::vec(0i64..4, 0..30)) {
            let got = majority_element(&seq);
            if let Some(v) = got {
                prop_assert!(seq.iter().filter(|&&x| x == v).count() > seq.len() / 2);
            }
            prop_assert_eq!(got, brute_force_majority(&seq));
        }

        #[test]
        fn longest_run_ignores_order_and_duplicates(
            seq in prop::collection::vec(-20i64..20, 0..30),
            seed in any::<u64>(),
        ) {
            let expected = longest_consecutive_run(&seq);

            let mut deduped = seq.clone();
            deduped.sort_unstable();
            deduped.dedup();
            prop_assert_eq!(longest_consecutive_run(&deduped), expected);

            let mut doubled = seq.clone();
            doubled.extend_from_slice(&seq);
            prop_assert_eq!(longest_consecutive_run(&doubled), expected);

            let mut rotated = seq.clone();
            if !rotated.is_empty() {
                let k = (seed as usize) % rotated.len();
                rotated.rotate_left(k);
                rotated.reverse();
            }
            prop_assert_eq!(longest_consecutive_run(&rotated), expected);
        }

        #[test]
        fn xor_count_matches_brute_force(
            seq in prop::collection::vec(-8i64..8, 0..12),
            target in -8i64..8,
        ) {
            prop_assert_eq!(count_subarrays_xor(&seq, target), brute_force_xor_count(&seq, target));
        }
    }
}
