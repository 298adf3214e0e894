//! Histogram synthesis for column profiling.
//!
//! Database catalogs describe a column with two independent summaries: an approximate quantile histogram (cumulative
//! counts at a set of boundary values) and an exact list of the most frequent values. This crate turns the former into
//! a bucketed [`Histogram`] and then folds the latter into it, producing a single histogram where every frequent value
//! owns an exact bucket, range buckets are split around those values, and the overall frequency is conserved.
//!
//! The value domain of a column is described by a [`Domain`] operator, which provides the successor, predecessor and
//! inclusive range size needed to treat an ordered domain as a discrete counting space. Five operators are provided,
//! and [`ColumnDomain`] holds whichever one a column resolves to.
//!
//! # Quick Start
//!
//! ```
//! use histogram_synthesis::{ingest, synthesize, IntegerDomain, QuantileRow, QuantileStatistics};
//!
//! let stats = QuantileStatistics {
//!     reported_min: 1,
//!     cardinality: 10,
//!     num_nulls: 0,
//!     rows: vec![QuantileRow::new(10, 100)],
//! };
//!
//! let histogram = ingest(IntegerDomain, &stats).unwrap();
//! let synthesized = synthesize(&histogram, &[(5, 20)]).unwrap();
//!
//! assert_eq!(synthesized.len(), 3);
//! assert_eq!(synthesized.total_count(), 100);
//! assert_eq!(synthesized.frequency_of(&5), 20);
//! ```
#![deny(warnings)]
#![deny(missing_docs)]

mod apportion;

pub mod domain;
pub use self::domain::{CharDomain, ColumnDomain, DateDomain, DecimalDomain, Domain, IntegerDomain, StringDomain};

mod error;
pub use self::error::{DomainError, ErrorKind, HistogramError};

mod histogram;
pub use self::histogram::{Bucket, Histogram, HistogramBuilder};

mod ingest;
pub use self::ingest::{ingest, QuantileRow, QuantileStatistics};

mod query;

mod synthesis;
pub use self::synthesis::{exact_histogram, synthesize};
