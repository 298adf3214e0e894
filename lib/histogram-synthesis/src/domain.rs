//! Value domains.
//!
//! A [`Domain`] describes an ordered, discrete value space well enough to count it: every value has a successor and a
//! predecessor (where representable), and any two values delimit an inclusive range whose size can be computed
//! exactly. Histogram buckets rely on this to split a range around a single value and to redistribute frequency in
//! proportion to the size of each side.

use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{DomainError, NoPredecessor, NoSuccessor};

const MAX_DECIMAL_SCALE: u32 = 28;

/// The algebra of an ordered, discrete value domain.
///
/// Implementations must uphold the following:
///
/// - `range(v, v) == 1`
/// - `range(a, b) == range(b, a)`
/// - `increment(decrement(v)) == v` wherever both are defined
/// - for `a <= k <= b`, `range(a, b) == range(a, k) + range(increment(k), b)` wherever `increment(k)` is defined
pub trait Domain: Clone + fmt::Debug {
    /// The value type of the domain.
    type Value: Clone + fmt::Debug + fmt::Display;

    /// Returns the name of the domain, used when reporting errors.
    fn name(&self) -> &'static str;

    /// Compares two values.
    fn compare(&self, a: &Self::Value, b: &Self::Value) -> Ordering;

    /// Returns the successor of the given value.
    ///
    /// # Errors
    ///
    /// If the successor is not representable, an error is returned.
    fn increment(&self, value: &Self::Value) -> Result<Self::Value, DomainError>;

    /// Returns the predecessor of the given value.
    ///
    /// # Errors
    ///
    /// If the predecessor is not representable, an error is returned.
    fn decrement(&self, value: &Self::Value) -> Result<Self::Value, DomainError>;

    /// Returns the number of distinct domain values in the inclusive range between `a` and `b`, in either order.
    fn range(&self, a: &Self::Value, b: &Self::Value) -> u128;

    /// Returns the smaller of two values.
    fn min<'a>(&self, a: &'a Self::Value, b: &'a Self::Value) -> &'a Self::Value {
        match self.compare(a, b) {
            Ordering::Greater => b,
            _ => a,
        }
    }

    /// Returns the larger of two values.
    fn max<'a>(&self, a: &'a Self::Value, b: &'a Self::Value) -> &'a Self::Value {
        match self.compare(a, b) {
            Ordering::Less => b,
            _ => a,
        }
    }

    /// Returns `true` if both values are the same domain value.
    fn equal(&self, a: &Self::Value, b: &Self::Value) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Signed 64-bit integers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntegerDomain;

impl Domain for IntegerDomain {
    type Value = i64;

    fn name(&self) -> &'static str {
        "integer"
    }

    fn compare(&self, a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    fn increment(&self, value: &i64) -> Result<i64, DomainError> {
        value.checked_add(1).ok_or_else(|| {
            NoSuccessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn decrement(&self, value: &i64) -> Result<i64, DomainError> {
        value.checked_sub(1).ok_or_else(|| {
            NoPredecessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn range(&self, a: &i64, b: &i64) -> u128 {
        (i128::from(*a) - i128::from(*b)).unsigned_abs() + 1
    }
}

/// Fixed-scale decimals.
///
/// The domain is the lattice of decimals with exactly `scale` fractional digits, so neighbouring values are
/// `10^-scale` apart. Ranges are counted on the unscaled integer mantissas, never in floating point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DecimalDomain {
    scale: u32,
}

impl DecimalDomain {
    /// Creates a new `DecimalDomain` with the given scale.
    ///
    /// Scales above the maximum supported by [`Decimal`] (28) are clamped.
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.min(MAX_DECIMAL_SCALE),
        }
    }

    /// Returns the scale of the domain.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns the given value rounded onto the domain lattice.
    pub fn normalize(&self, value: &Decimal) -> Decimal {
        let mut normalized = *value;
        normalized.rescale(self.scale);
        normalized
    }

    fn step(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }
}

impl Domain for DecimalDomain {
    type Value = Decimal;

    fn name(&self) -> &'static str {
        "decimal"
    }

    fn compare(&self, a: &Decimal, b: &Decimal) -> Ordering {
        a.cmp(b)
    }

    fn increment(&self, value: &Decimal) -> Result<Decimal, DomainError> {
        self.normalize(value)
            .checked_add(self.step())
            .map(|next| self.normalize(&next))
            .ok_or_else(|| {
                NoSuccessor {
                    domain: self.name(),
                    value: value.to_string(),
                }
                .build()
            })
    }

    fn decrement(&self, value: &Decimal) -> Result<Decimal, DomainError> {
        self.normalize(value)
            .checked_sub(self.step())
            .map(|prev| self.normalize(&prev))
            .ok_or_else(|| {
                NoPredecessor {
                    domain: self.name(),
                    value: value.to_string(),
                }
                .build()
            })
    }

    fn range(&self, a: &Decimal, b: &Decimal) -> u128 {
        let a = self.normalize(a).mantissa();
        let b = self.normalize(b).mantissa();
        a.abs_diff(b) + 1
    }
}

/// Calendar dates at day granularity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DateDomain;

impl Domain for DateDomain {
    type Value = NaiveDate;

    fn name(&self) -> &'static str {
        "date"
    }

    fn compare(&self, a: &NaiveDate, b: &NaiveDate) -> Ordering {
        a.cmp(b)
    }

    fn increment(&self, value: &NaiveDate) -> Result<NaiveDate, DomainError> {
        value.succ_opt().ok_or_else(|| {
            NoSuccessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn decrement(&self, value: &NaiveDate) -> Result<NaiveDate, DomainError> {
        value.pred_opt().ok_or_else(|| {
            NoPredecessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn range(&self, a: &NaiveDate, b: &NaiveDate) -> u128 {
        u128::from(a.signed_duration_since(*b).num_days().unsigned_abs()) + 1
    }
}

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;

fn char_successor(c: char) -> Option<char> {
    match c as u32 {
        cp if cp == SURROGATE_START - 1 => char::from_u32(SURROGATE_END + 1),
        cp => char::from_u32(cp.checked_add(1)?),
    }
}

fn char_predecessor(c: char) -> Option<char> {
    match c as u32 {
        cp if cp == SURROGATE_END + 1 => char::from_u32(SURROGATE_START - 1),
        cp => char::from_u32(cp.checked_sub(1)?),
    }
}

/// Single Unicode scalar values, ordered by code point.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CharDomain;

impl Domain for CharDomain {
    type Value = char;

    fn name(&self) -> &'static str {
        "character"
    }

    fn compare(&self, a: &char, b: &char) -> Ordering {
        a.cmp(b)
    }

    fn increment(&self, value: &char) -> Result<char, DomainError> {
        char_successor(*value).ok_or_else(|| {
            NoSuccessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn decrement(&self, value: &char) -> Result<char, DomainError> {
        char_predecessor(*value).ok_or_else(|| {
            NoPredecessor {
                domain: self.name(),
                value: value.to_string(),
            }
            .build()
        })
    }

    fn range(&self, a: &char, b: &char) -> u128 {
        let (lo, hi) = if a <= b { (*a as u32, *b as u32) } else { (*b as u32, *a as u32) };
        let mut size = hi - lo + 1;

        // Surrogates are not scalar values, so they are not part of the domain.
        if lo < SURROGATE_START && hi > SURROGATE_END {
            size -= SURROGATE_END - SURROGATE_START + 1;
        }

        u128::from(size)
    }
}

/// Strings, ordered by code point.
///
/// Successor and predecessor step the code point of the last character. The size of a range is an approximation:
/// both strings are right-padded with blanks to the same length, and the per-position code point distances are summed.
/// It is neither a metric on lexicographic order nor conserved under splitting for strings of different lengths, but
/// downstream consumers are calibrated against it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StringDomain;

impl Domain for StringDomain {
    type Value = String;

    fn name(&self) -> &'static str {
        "string"
    }

    fn compare(&self, a: &String, b: &String) -> Ordering {
        // UTF-8 byte order is code point order.
        a.cmp(b)
    }

    fn increment(&self, value: &String) -> Result<String, DomainError> {
        let mut next = value.clone();
        match next.pop() {
            None => next.push('\0'),
            Some(last) => match char_successor(last) {
                Some(c) => next.push(c),
                None => {
                    return NoSuccessor {
                        domain: self.name(),
                        value: value.clone(),
                    }
                    .fail()
                }
            },
        }
        Ok(next)
    }

    fn decrement(&self, value: &String) -> Result<String, DomainError> {
        let mut prev = value.clone();
        match prev.pop().and_then(char_predecessor) {
            Some(c) => {
                prev.push(c);
                Ok(prev)
            }
            None => NoPredecessor {
                domain: self.name(),
                value: value.clone(),
            }
            .fail(),
        }
    }

    fn range(&self, a: &String, b: &String) -> u128 {
        let mut a_chars = a.chars();
        let mut b_chars = b.chars();
        let mut distance = 0u128;

        loop {
            let (ac, bc) = match (a_chars.next(), b_chars.next()) {
                (None, None) => break,
                (ac, bc) => (ac.unwrap_or(' '), bc.unwrap_or(' ')),
            };
            distance += u128::from((ac as u32).abs_diff(bc as u32));
        }

        distance + 1
    }
}

/// The domain of a column, resolved once from its type descriptor.
///
/// Each variant carries the operator for one supported value type. Code that needs to work with the values of a column
/// matches on this once and then runs generically over the selected [`Domain`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnDomain {
    /// Integer column.
    Integer(IntegerDomain),

    /// Fixed-scale decimal column.
    Decimal(DecimalDomain),

    /// Date column.
    Date(DateDomain),

    /// Single character column.
    Char(CharDomain),

    /// String column.
    String(StringDomain),
}

impl ColumnDomain {
    /// Returns the name of the underlying domain.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer(d) => d.name(),
            Self::Decimal(d) => d.name(),
            Self::Date(d) => d.name(),
            Self::Char(d) => d.name(),
            Self::String(d) => d.name(),
        }
    }
}
