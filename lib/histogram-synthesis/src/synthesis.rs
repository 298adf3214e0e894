//! Histogram synthesis.

use std::cmp::Ordering;

use snafu::{ensure, OptionExt as _};
use tracing::{debug, warn};

use crate::{
    apportion::apportion,
    domain::Domain,
    error::{
        CountOverflow, DuplicateKey, HistogramError, KeyNotCovered, KeyOutOfRange, NegativeFrequency,
        UnallocatedFrequency,
    },
    histogram::{Bucket, Histogram, HistogramBuilder},
};

/// A piece of a source bucket after cutting out its frequent values.
enum Segment<V> {
    Range { lower: V, upper: V },
    Exact { value: V, count: u64 },
}

/// Merges exact frequent-value counts into a histogram.
///
/// Every frequent value ends up in an exact bucket holding its exact count. Any bucket that contained frequent values
/// is split around them, and the frequency left over once their exact counts are removed is spread across the remaining
/// range pieces in proportion to the number of domain values each covers, using largest-remainder rounding so that no
/// unit is lost or gained. The frequent values are expected to already be counted within the histogram's buckets, in
/// which case the total count of the result equals the total count of `histogram`.
///
/// A bucket that is already exact simply takes on the exact count of its value.
///
/// In domains whose successor and predecessor do not preserve order, such as strings, a range piece can end up with no
/// representable bounds: the predecessor of a key sorts below the piece's start, or the successor of a key sorts above
/// the bucket's end. Such pieces are dropped, and the frequency left over goes to the pieces that remain.
///
/// Frequent values may be given in any order.
///
/// # Errors
///
/// If a frequent value is listed twice, lies outside the histogram, or falls into a gap between buckets, an input error
/// is returned. If the exact counts attributed to a bucket exceed its frequency, or a bucket has frequency left over
/// with no range left to hold it, a consistency error is returned.
pub fn synthesize<D: Domain>(
    histogram: &Histogram<D>, frequent: &[(D::Value, u64)],
) -> Result<Histogram<D>, HistogramError> {
    if frequent.is_empty() {
        return Ok(histogram.clone());
    }

    let domain = histogram.domain();
    let keys = sorted_keys(domain, frequent)?;
    check_key_bounds(histogram, &keys)?;

    let mut builder = HistogramBuilder::with_capacity(domain.clone(), histogram.len() + 2 * keys.len());
    let mut expected_total = histogram.total_count();
    let mut next_key = 0;

    for bucket in histogram.buckets() {
        let start = next_key;
        while next_key < keys.len() && domain.compare(keys[next_key].0, bucket.upper()) != Ordering::Greater {
            ensure!(
                domain.compare(keys[next_key].0, bucket.lower()) != Ordering::Less,
                KeyNotCovered {
                    key: keys[next_key].0.to_string(),
                }
            );
            next_key += 1;
        }

        let bucket_keys = &keys[start..next_key];
        if bucket_keys.is_empty() {
            builder.push(bucket.clone());
            continue;
        }

        if bucket.is_exact(domain) {
            let (value, count) = bucket_keys[0];
            ensure_within_frequency(bucket, count)?;
            if count != bucket.frequency() {
                warn!(
                    value = %value,
                    catalog_frequency = bucket.frequency(),
                    exact_count = count,
                    "Exact count differs from singleton bucket frequency. Using exact count."
                );
                expected_total = expected_total - bucket.frequency() + count;
            }
            builder.add(value.clone(), value.clone(), count);
            continue;
        }

        for piece in split_bucket(domain, bucket, bucket_keys)? {
            builder.push(piece);
        }
    }

    // Any keys we didn't consume fell into a gap past the last bucket that still ended before the maximum.
    if let Some((key, _)) = keys.get(next_key) {
        return KeyNotCovered { key: key.to_string() }.fail();
    }

    let synthesized = builder.build()?;
    synthesized.verify_total(expected_total)?;

    debug!(
        domain = domain.name(),
        buckets_before = histogram.len(),
        buckets_after = synthesized.len(),
        frequent_values = keys.len(),
        total = synthesized.total_count(),
        "Synthesized histogram."
    );

    Ok(synthesized)
}

/// Builds a histogram made only of exact buckets, one per frequent value.
///
/// Used for columns that have frequent values but no quantile statistics. Frequent values may be given in any order.
///
/// # Errors
///
/// If a frequent value is listed twice, an input error is returned. If the counts sum past `u64::MAX`, a consistency
/// error is returned.
pub fn exact_histogram<D: Domain>(domain: D, frequent: &[(D::Value, u64)]) -> Result<Histogram<D>, HistogramError> {
    let keys = sorted_keys(&domain, frequent)?;

    let mut builder = HistogramBuilder::with_capacity(domain, keys.len());
    for (value, count) in keys {
        builder.add(value.clone(), value.clone(), count);
    }
    builder.build()
}

fn sorted_keys<'a, D: Domain>(
    domain: &D, frequent: &'a [(D::Value, u64)],
) -> Result<Vec<(&'a D::Value, u64)>, HistogramError> {
    let mut keys = frequent.iter().map(|(v, c)| (v, *c)).collect::<Vec<_>>();

    // Each split narrows the remainder of the bucket that later keys operate on, so keys must be processed in order.
    keys.sort_by(|a, b| domain.compare(a.0, b.0));

    if let Some(pair) = keys.windows(2).find(|pair| domain.equal(pair[0].0, pair[1].0)) {
        return DuplicateKey {
            key: pair[0].0.to_string(),
        }
        .fail();
    }

    Ok(keys)
}

fn check_key_bounds<D: Domain>(histogram: &Histogram<D>, keys: &[(&D::Value, u64)]) -> Result<(), HistogramError> {
    let domain = histogram.domain();
    let (Some(min), Some(max)) = (histogram.min(), histogram.max()) else {
        return match keys.first() {
            Some((key, _)) => KeyNotCovered { key: key.to_string() }.fail(),
            None => Ok(()),
        };
    };

    for (key, _) in keys {
        ensure!(
            domain.compare(key, min) != Ordering::Less && domain.compare(key, max) != Ordering::Greater,
            KeyOutOfRange {
                key: key.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            }
        );
    }

    Ok(())
}

fn ensure_within_frequency<V: std::fmt::Display>(bucket: &Bucket<V>, removed: u64) -> Result<u64, HistogramError> {
    match bucket.frequency().checked_sub(removed) {
        Some(residual) => Ok(residual),
        None => NegativeFrequency {
            lower: bucket.lower().to_string(),
            upper: bucket.upper().to_string(),
            frequency: bucket.frequency(),
            removed,
        }
        .fail(),
    }
}

/// Cuts the given keys out of a range bucket.
///
/// Keys must be sorted, distinct, and all fall within the bucket.
fn split_bucket<D: Domain>(
    domain: &D, bucket: &Bucket<D::Value>, keys: &[(&D::Value, u64)],
) -> Result<Vec<Bucket<D::Value>>, HistogramError> {
    let mut removed = 0u64;
    for (_, count) in keys {
        removed = removed.checked_add(*count).context(CountOverflow {
            lower: bucket.lower().to_string(),
            upper: bucket.upper().to_string(),
        })?;
    }
    let residual = ensure_within_frequency(bucket, removed)?;

    let mut segments = Vec::with_capacity(2 * keys.len() + 1);
    let mut cursor = Some(bucket.lower().clone());

    for (key, count) in keys {
        if let Some(lower) = cursor.take() {
            if domain.compare(&lower, key) == Ordering::Less {
                let upper = domain.decrement(key)?;
                // When neighbours do not preserve order, as when the predecessor of "b" is "a" while the piece starts
                // at "apple", the piece has no representable bounds and is dropped.
                if domain.compare(&lower, &upper) != Ordering::Greater {
                    segments.push(Segment::Range { lower, upper });
                } else {
                    debug!(lower = %lower, key = %key, "Dropping range piece below key with no representable bounds.");
                }
            }
        }

        segments.push(Segment::Exact {
            value: (*key).clone(),
            count: *count,
        });

        // A key sitting on the upper bound leaves nothing after it, and may not even have a successor.
        if !domain.equal(key, bucket.upper()) {
            let next = domain.increment(key)?;
            if domain.compare(&next, bucket.upper()) != Ordering::Greater {
                cursor = Some(next);
            } else {
                debug!(key = %key, upper = %bucket.upper(), "Successor of key passes bucket upper bound.");
            }
        }
    }

    if let Some(lower) = cursor {
        segments.push(Segment::Range {
            lower,
            upper: bucket.upper().clone(),
        });
    }

    let weights = segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Range { lower, upper } => Some(domain.range(lower, upper)),
            Segment::Exact { .. } => None,
        })
        .collect::<Vec<_>>();

    ensure!(
        !weights.is_empty() || residual == 0,
        UnallocatedFrequency {
            lower: bucket.lower().to_string(),
            upper: bucket.upper().to_string(),
            residual,
        }
    );

    let mut shares = apportion(residual, &weights).into_iter();
    let buckets = segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Range { lower, upper } => Bucket::new(lower, upper, shares.next().unwrap_or(0)),
            Segment::Exact { value, count } => Bucket::new(value.clone(), value, count),
        })
        .collect::<Vec<_>>();

    debug!(
        lower = %bucket.lower(),
        upper = %bucket.upper(),
        frequency = bucket.frequency(),
        frequent_values = keys.len(),
        residual,
        pieces = buckets.len(),
        "Split bucket around frequent values."
    );

    Ok(buckets)
}
