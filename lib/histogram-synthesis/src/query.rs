//! Point estimates over a histogram.

use crate::{
    domain::Domain,
    histogram::{Bucket, Histogram},
};

impl<D: Domain> Histogram<D> {
    /// Returns the bucket containing the given value, if any.
    pub fn bucket_of(&self, value: &D::Value) -> Option<&Bucket<D::Value>> {
        self.bucket_index_of(value).map(|index| &self.buckets()[index])
    }

    /// Returns the estimated number of occurrences of the given value.
    ///
    /// Values held by an exact bucket return their exact count. Values within a range bucket return the bucket's
    /// frequency divided evenly across every value in the range, truncated. Values not covered by any bucket return
    /// zero.
    pub fn frequency_of(&self, value: &D::Value) -> u64 {
        let Some(bucket) = self.bucket_of(value) else {
            return 0;
        };

        let cardinality = bucket.cardinality(self.domain()).max(1);

        // The quotient never exceeds the frequency, so it fits.
        (u128::from(bucket.frequency()) / cardinality) as u64
    }

    /// Returns the estimated probability of the given value among all values in the histogram.
    ///
    /// An empty histogram, or one with a total count of zero, returns zero for every value.
    pub fn probability_of(&self, value: &D::Value) -> f64 {
        match self.total_count() {
            0 => 0.0,
            total => self.frequency_of(value) as f64 / total as f64,
        }
    }

    /// Returns the values held by exact buckets, along with their counts, in ascending order.
    pub fn most_frequent(&self) -> Vec<(D::Value, u64)> {
        self.buckets()
            .iter()
            .filter(|b| b.is_exact(self.domain()))
            .map(|b| (b.lower().clone(), b.frequency()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use crate::{synthesize, DecimalDomain, HistogramBuilder, IntegerDomain};

    #[test]
    fn point_estimates() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(1, 10, 100);
        let h = synthesize(&builder.build().unwrap(), &[(5, 20)]).unwrap();

        assert_eq!(h.bucket_of(&5).map(|b| b.frequency()), Some(20));
        assert_eq!(h.frequency_of(&5), 20);
        // [1, 4] holds 36, so 9 each.
        assert_eq!(h.frequency_of(&2), 9);
        // [6, 10] holds 44, so 8 each after truncation.
        assert_eq!(h.frequency_of(&7), 8);
        assert_eq!(h.frequency_of(&11), 0);

        assert!((h.probability_of(&5) - 0.2).abs() < f64::EPSILON);
        assert_eq!(h.probability_of(&42), 0.0);
    }

    #[test]
    fn most_frequent() {
        let mut builder = HistogramBuilder::new(IntegerDomain);
        builder.add(1, 10, 100).add(11, 20, 100);
        let h = synthesize(&builder.build().unwrap(), &[(15, 30), (3, 10)]).unwrap();

        assert_eq!(h.most_frequent(), vec![(3, 10), (15, 30)]);
    }

    #[test]
    fn empty_histogram() {
        let h = HistogramBuilder::new(IntegerDomain).build().unwrap();
        assert_eq!(h.frequency_of(&1), 0);
        assert_eq!(h.probability_of(&1), 0.0);
        assert!(h.most_frequent().is_empty());
    }

    #[test]
    fn decimal_buckets_spread_over_lattice() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();

        let mut builder = HistogramBuilder::new(DecimalDomain::new(2));
        builder.add(dec("1.00"), dec("2.00"), 202);
        let h = builder.build().unwrap();

        assert_eq!(h.cardinality(), 101);
        assert_eq!(h.frequency_of(&dec("1.50")), 2);
    }
}
