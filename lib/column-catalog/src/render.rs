//! Distribution and domain file rendering.
//!
//! Both formats are line oriented with `|` separated fields. Probabilities are relative to every row of the column,
//! nulls included, so the probabilities of a distribution file sum to one together with its null probability.
//!
//! Values holding a `|`, a line break, or a leading single quote are written in single quotes, with embedded quotes
//! doubled the way catalogs quote text. Inside quotes, line breaks and backslashes are written as `\n`, `\r` and
//! `\\`, so every record stays on one line.

use std::{borrow::Cow, fmt::Write as _};

use crate::ColumnProfile;

/// Renders the distribution file of a column.
///
/// The file starts with three `name=value` header lines giving the number of exact values, the number of range bins
/// and the null probability. One `value|probability` line per exact bucket follows, then one
/// `lower|upper|probability` line per range bucket.
pub fn render_distribution(profile: &ColumnProfile) -> String {
    let num_exact = profile.exact_buckets().count();
    let num_bins = profile.range_buckets().count();

    let mut out = String::new();
    let _ = writeln!(out, "numberOfExactValues={}", num_exact);
    let _ = writeln!(out, "numberOfBins={}", num_bins);
    let _ = writeln!(out, "nullProbability={}", profile.null_probability());

    for bucket in profile.exact_buckets() {
        let _ = writeln!(out, "{}|{}", escape(&bucket.lower), profile.bucket_probability(bucket));
    }
    for bucket in profile.range_buckets() {
        let _ = writeln!(
            out,
            "{}|{}|{}",
            escape(&bucket.lower),
            escape(&bucket.upper),
            profile.bucket_probability(bucket)
        );
    }

    out
}

/// Renders the domain file of a column.
///
/// Returns `None` unless the column is fully enumerated, that is, unless every one of its distinct values has an exact
/// bucket. Otherwise, one `value|probability` line is produced per exact bucket.
pub fn render_domain(profile: &ColumnProfile) -> Option<String> {
    if !profile.is_fully_enumerated() {
        return None;
    }

    let mut out = String::new();
    for bucket in profile.exact_buckets() {
        let _ = writeln!(out, "{}|{}", escape(&bucket.lower), profile.bucket_probability(bucket));
    }
    Some(out)
}

fn escape(value: &str) -> Cow<'_, str> {
    let needs_quoting = value.starts_with('\'') || value.contains(|c| matches!(c, '|' | '\n' | '\r'));
    if !needs_quoting {
        return Cow::Borrowed(value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}
