//! Catalog-facing side of column profiling.
//!
//! Database catalogs report column statistics as text: boundary values and frequent values are rendered in the
//! column's SQL type, and the type itself is only known through a descriptor. This crate resolves each column's type to
//! a [`ColumnDomain`][histogram_synthesis::ColumnDomain], parses the textual statistics into typed values, runs them
//! through ingestion and synthesis, and renders the result as distribution and domain files.
#![deny(warnings)]
#![deny(missing_docs)]

mod column_type;
pub use self::column_type::ColumnType;

mod error;
pub use self::error::{CatalogError, ParseError};

mod parser;
pub use self::parser::ValueParser;

mod profile;
pub use self::profile::{profile_column, ColumnProfile, ProfileBucket};

mod registry;
pub use self::registry::{DomainRegistry, QualifiedColumn};

pub mod render;

mod snapshot;
pub use self::snapshot::{CatalogColumn, CatalogSnapshot, FrequentValueRow, QuantileValueRow};
