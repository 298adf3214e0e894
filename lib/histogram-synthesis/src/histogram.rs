//! Bucketed histograms.

use std::cmp::Ordering;

use snafu::{ensure, OptionExt as _};

use crate::{
    domain::Domain,
    error::{CountOverflow, HistogramError, InvertedBucket, OverlappingBucket, TotalMismatch},
};

/// A histogram bucket.
///
/// A bucket covers the inclusive range `[lower, upper]` of its domain. When both bounds are the same value, the bucket
/// is an _exact_ bucket and its frequency is the exact count of that value. Otherwise, it is a _range_ bucket and its
/// frequency is assumed to be spread uniformly across every value in the range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bucket<V> {
    lower: V,
    upper: V,
    frequency: u64,
}

impl<V> Bucket<V> {
    /// Creates a new `Bucket`.
    pub fn new(lower: V, upper: V, frequency: u64) -> Self {
        Self {
            lower,
            upper,
            frequency,
        }
    }

    /// Returns the inclusive lower bound of the bucket.
    pub fn lower(&self) -> &V {
        &self.lower
    }

    /// Returns the inclusive upper bound of the bucket.
    pub fn upper(&self) -> &V {
        &self.upper
    }

    /// Returns the number of values in the bucket.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Returns `true` if the bucket holds the exact count of a single value.
    pub fn is_exact<D>(&self, domain: &D) -> bool
    where
        D: Domain<Value = V>,
    {
        domain.equal(&self.lower, &self.upper)
    }

    /// Returns `true` if the given value falls within the bucket.
    pub fn contains<D>(&self, domain: &D, value: &V) -> bool
    where
        D: Domain<Value = V>,
    {
        domain.compare(&self.lower, value) != Ordering::Greater
            && domain.compare(value, &self.upper) != Ordering::Greater
    }

    /// Returns the number of distinct domain values covered by the bucket.
    pub fn cardinality<D>(&self, domain: &D) -> u128
    where
        D: Domain<Value = V>,
    {
        domain.range(&self.lower, &self.upper)
    }

    /// Moves the upper bound of the bucket to `upper`, taking on `frequency` more values.
    pub(crate) fn extend_to(&mut self, upper: V, frequency: u64) {
        self.upper = upper;
        self.frequency += frequency;
    }
}

/// Builder for [`Histogram`].
///
/// Buckets are appended in ascending order, and the histogram is validated once when it is built.
#[derive(Clone, Debug)]
pub struct HistogramBuilder<D: Domain> {
    domain: D,
    buckets: Vec<Bucket<D::Value>>,
}

impl<D: Domain> HistogramBuilder<D> {
    /// Creates a new `HistogramBuilder` over the given domain.
    pub fn new(domain: D) -> Self {
        Self::with_capacity(domain, 0)
    }

    /// Creates a new `HistogramBuilder` over the given domain, with room for `capacity` buckets.
    pub fn with_capacity(domain: D, capacity: usize) -> Self {
        Self {
            domain,
            buckets: Vec::with_capacity(capacity),
        }
    }

    /// Returns the domain of the histogram being built.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Appends a bucket.
    pub fn add(&mut self, lower: D::Value, upper: D::Value, frequency: u64) -> &mut Self {
        self.buckets.push(Bucket::new(lower, upper, frequency));
        self
    }

    /// Appends an existing bucket.
    pub fn push(&mut self, bucket: Bucket<D::Value>) -> &mut Self {
        self.buckets.push(bucket);
        self
    }

    /// Returns the most recently appended bucket.
    pub(crate) fn last_mut(&mut self) -> Option<&mut Bucket<D::Value>> {
        self.buckets.last_mut()
    }

    /// Validates the buckets and builds the histogram.
    ///
    /// # Errors
    ///
    /// If any bucket has a lower bound above its upper bound, any bucket does not start strictly after the previous
    /// bucket ends, or the frequencies sum past `u64::MAX`, an error is returned.
    pub fn build(self) -> Result<Histogram<D>, HistogramError> {
        let mut previous: Option<&Bucket<D::Value>> = None;
        for (index, bucket) in self.buckets.iter().enumerate() {
            ensure!(
                self.domain.compare(&bucket.lower, &bucket.upper) != Ordering::Greater,
                InvertedBucket {
                    index,
                    lower: bucket.lower.to_string(),
                    upper: bucket.upper.to_string(),
                }
            );

            if let Some(previous) = previous {
                ensure!(
                    self.domain.compare(&previous.upper, &bucket.lower) == Ordering::Less,
                    OverlappingBucket {
                        index,
                        lower: bucket.lower.to_string(),
                        previous_upper: previous.upper.to_string(),
                    }
                );
            }

            previous = Some(bucket);
        }

        let mut total_count = 0u64;
        for bucket in &self.buckets {
            total_count = total_count.checked_add(bucket.frequency).context(CountOverflow {
                lower: bucket.lower.to_string(),
                upper: bucket.upper.to_string(),
            })?;
        }

        Ok(Histogram {
            domain: self.domain,
            buckets: self.buckets,
            total_count,
        })
    }
}

/// A bucketed histogram.
///
/// Buckets are sorted by their lower bound and never overlap. A histogram is immutable once built: operations that
/// refine it, such as [`synthesize`][crate::synthesize], produce a new histogram.
#[derive(Clone, Debug)]
pub struct Histogram<D: Domain> {
    domain: D,
    buckets: Vec<Bucket<D::Value>>,
    total_count: u64,
}

impl<D: Domain> Histogram<D> {
    /// Creates an empty histogram over the given domain.
    pub fn empty(domain: D) -> Self {
        Self {
            domain,
            buckets: Vec::new(),
            total_count: 0,
        }
    }

    /// Returns the domain of the histogram.
    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Returns the buckets of the histogram, in ascending order.
    pub fn buckets(&self) -> &[Bucket<D::Value>] {
        &self.buckets
    }

    /// Returns the number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the histogram has no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the sum of all bucket frequencies.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns the lower bound of the first bucket.
    pub fn min(&self) -> Option<&D::Value> {
        self.buckets.first().map(|b| &b.lower)
    }

    /// Returns the upper bound of the last bucket.
    pub fn max(&self) -> Option<&D::Value> {
        self.buckets.last().map(|b| &b.upper)
    }

    /// Returns the number of distinct domain values between the minimum and maximum of the histogram.
    ///
    /// An empty histogram has a cardinality of zero.
    pub fn cardinality(&self) -> u128 {
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => self.domain.range(min, max),
            _ => 0,
        }
    }

    /// Returns the index of the bucket containing the given value.
    ///
    /// Returns `None` if the value is outside the histogram or falls into a gap between buckets.
    pub fn bucket_index_of(&self, value: &D::Value) -> Option<usize> {
        // Buckets are few, so a linear scan on the upper bound is all we need.
        let index = self
            .buckets
            .iter()
            .position(|b| self.domain.compare(value, &b.upper) != Ordering::Greater)?;

        if self.domain.compare(value, &self.buckets[index].lower) == Ordering::Less {
            return None;
        }

        Some(index)
    }

    /// Returns a histogram containing only the exact buckets.
    pub fn exact_sub_histogram(&self) -> Self {
        self.partition(true)
    }

    /// Returns a histogram containing only the range buckets.
    pub fn range_sub_histogram(&self) -> Self {
        self.partition(false)
    }

    /// Checks that the histogram holds the expected total count.
    ///
    /// # Errors
    ///
    /// If the total count of the histogram differs from `expected`, an error is returned.
    pub fn verify_total(&self, expected: u64) -> Result<(), HistogramError> {
        ensure!(
            self.total_count == expected,
            TotalMismatch {
                expected,
                actual: self.total_count,
            }
        );
        Ok(())
    }

    fn partition(&self, exact: bool) -> Self {
        let buckets = self
            .buckets
            .iter()
            .filter(|b| b.is_exact(&self.domain) == exact)
            .cloned()
            .collect::<Vec<_>>();
        let total_count = buckets.iter().map(|b| b.frequency).sum();

        Self {
            domain: self.domain.clone(),
            buckets,
            total_count,
        }
    }
}

impl<D: Domain> PartialEq for Histogram<D>
where
    D: PartialEq,
    D::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.buckets == other.buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::IntegerDomain, ErrorKind};

    fn histogram(buckets: &[(i64, i64, u64)]) -> Histogram<IntegerDomain> {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        for (lower, upper, frequency) in buckets {
            builder.add(*lower, *upper, *frequency);
        }
        builder.build().expect("test histogram should be valid")
    }

    #[test]
    fn empty() {
        let h = HistogramBuilder::new(IntegerDomain).build().unwrap();
        assert!(h.is_empty());
        assert_eq!(h.total_count(), 0);
        assert_eq!(h.cardinality(), 0);
        assert_eq!(h.min(), None);
        assert_eq!(h.bucket_index_of(&1), None);
    }

    #[test]
    fn totals_and_cardinality() {
        let h = histogram(&[(1, 4, 10), (5, 5, 7), (6, 20, 30)]);
        assert_eq!(h.len(), 3);
        assert_eq!(h.total_count(), 47);
        assert_eq!(h.cardinality(), 20);
        assert_eq!(h.min(), Some(&1));
        assert_eq!(h.max(), Some(&20));
        assert!(h.verify_total(47).is_ok());

        let err = h.verify_total(48).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn bucket_lookup() {
        let h = histogram(&[(1, 4, 10), (5, 5, 7), (8, 20, 30)]);
        assert_eq!(h.bucket_index_of(&0), None);
        assert_eq!(h.bucket_index_of(&1), Some(0));
        assert_eq!(h.bucket_index_of(&4), Some(0));
        assert_eq!(h.bucket_index_of(&5), Some(1));
        // Gap between 5 and 8.
        assert_eq!(h.bucket_index_of(&6), None);
        assert_eq!(h.bucket_index_of(&8), Some(2));
        assert_eq!(h.bucket_index_of(&20), Some(2));
        assert_eq!(h.bucket_index_of(&21), None);
    }

    #[test]
    fn sub_histograms() {
        let h = histogram(&[(1, 4, 10), (5, 5, 7), (6, 20, 30), (21, 21, 3)]);

        let exact = h.exact_sub_histogram();
        assert_eq!(exact.buckets(), &[Bucket::new(5, 5, 7), Bucket::new(21, 21, 3)]);
        assert_eq!(exact.total_count(), 10);

        let range = h.range_sub_histogram();
        assert_eq!(range.buckets(), &[Bucket::new(1, 4, 10), Bucket::new(6, 20, 30)]);
        assert_eq!(range.total_count(), 40);
    }

    #[test]
    fn rejects_inverted_bucket() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(1, 4, 10).add(9, 5, 1);

        let err = builder.build().unwrap_err();
        assert!(matches!(err, HistogramError::InvertedBucket { index: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn rejects_overlapping_buckets() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(1, 4, 10).add(4, 8, 1);

        let err = builder.build().unwrap_err();
        assert!(matches!(err, HistogramError::OverlappingBucket { index: 1, .. }));
    }

    #[test]
    fn rejects_overflowing_total() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(1, 4, u64::MAX).add(5, 8, 1);

        let err = builder.build().unwrap_err();
        assert!(matches!(err, HistogramError::CountOverflow { .. }));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn rejects_unsorted_buckets() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(10, 14, 10).add(1, 8, 1);

        assert!(builder.build().is_err());
    }
}
