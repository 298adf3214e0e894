//! Largest-remainder apportionment.

/// Splits `total` into shares proportional to `weights`.
///
/// Each share starts as the floor of its exact quota, and the units lost to flooring are handed out one at a time to
/// the shares with the largest fractional remainders, with ties going to the earliest share. The returned shares always
/// sum to exactly `total`, unless every weight is zero, in which case every share is zero.
pub(crate) fn apportion(total: u64, weights: &[u128]) -> Vec<u64> {
    let weight_sum = weights.iter().fold(0u128, |sum, w| sum.saturating_add(*w));
    if weight_sum == 0 || weights.is_empty() {
        return vec![0; weights.len()];
    }

    let (mut shares, remainders) = quotas(total, weights, weight_sum);

    let assigned = shares.iter().map(|s| u128::from(*s)).sum::<u128>();
    let mut leftover = u128::from(total).saturating_sub(assigned);

    let mut order = (0..weights.len()).collect::<Vec<_>>();
    // Stable sort, so equal remainders keep their original order.
    order.sort_by(|a, b| remainders[*b].total_cmp(&remainders[*a]));

    for index in order.into_iter().cycle() {
        if leftover == 0 {
            break;
        }
        if weights[index] == 0 {
            continue;
        }
        shares[index] += 1;
        leftover -= 1;
    }

    shares
}

fn quotas(total: u64, weights: &[u128], weight_sum: u128) -> (Vec<u64>, Vec<f64>) {
    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());

    for weight in weights {
        match u128::from(total).checked_mul(*weight) {
            Some(scaled) => {
                // The share never exceeds `total`, so it fits.
                shares.push((scaled / weight_sum) as u64);
                remainders.push((scaled % weight_sum) as f64 / weight_sum as f64);
            }
            None => {
                // Only reachable for enormous domains; fall back to floating point for the quota itself.
                let quota = total as f64 * (*weight as f64 / weight_sum as f64);
                let floor = quota.floor().min(total as f64);
                shares.push(floor as u64);
                remainders.push(quota - floor);
            }
        }
    }

    // Floating point quotas can overshoot by a unit or two; trim from the back until we fit again.
    let total = u128::from(total);
    let mut assigned = shares.iter().map(|s| u128::from(*s)).sum::<u128>();
    for share in shares.iter_mut().rev() {
        if assigned <= total {
            break;
        }
        // The excess is bounded by the share being trimmed, so it fits.
        let trim = u128::from(*share).min(assigned - total) as u64;
        *share -= trim;
        assigned -= u128::from(trim);
    }

    (shares, remainders)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::apportion;

    #[test]
    fn exact_split() {
        assert_eq!(apportion(100, &[1, 1, 2]), vec![25, 25, 50]);
    }

    #[test]
    fn largest_remainder_wins() {
        // Quotas are 35.55.. and 44.44.., so the first share gets the unit lost to flooring.
        assert_eq!(apportion(80, &[4, 5]), vec![36, 44]);
    }

    #[test]
    fn ties_go_to_earliest() {
        assert_eq!(apportion(1, &[1, 1]), vec![1, 0]);
        assert_eq!(apportion(2, &[1, 1, 1]), vec![1, 1, 0]);
    }

    #[test]
    fn zero_weights_get_nothing() {
        assert_eq!(apportion(7, &[0, 3, 0]), vec![0, 7, 0]);
        assert_eq!(apportion(7, &[0, 0]), vec![0, 0]);
        assert_eq!(apportion(7, &[]), Vec::<u64>::new());
    }

    #[test]
    fn huge_weights() {
        let shares = apportion(u64::MAX, &[u128::MAX / 4, u128::MAX / 4]);
        assert_eq!(shares.iter().map(|s| u128::from(*s)).sum::<u128>(), u128::from(u64::MAX));
    }

    proptest! {
        #[test]
        fn property_test_apportion_conserves_total(
            total in 0u64..1_000_000,
            weights in proptest::collection::vec(1u128..10_000, 1..16),
        ) {
            let shares = apportion(total, &weights);
            prop_assert_eq!(shares.len(), weights.len());
            prop_assert_eq!(shares.iter().sum::<u64>(), total);
        }
    }
}
