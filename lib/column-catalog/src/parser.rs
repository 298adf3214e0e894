use std::{borrow::Cow, str::FromStr as _};

use chrono::{NaiveDate, NaiveDateTime};
use histogram_synthesis::{CharDomain, DateDomain, DecimalDomain, Domain, IntegerDomain, StringDomain};
use rust_decimal::Decimal;

use crate::error::{InvalidValue, ParseError};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d-%H.%M.%S", "%Y-%m-%dT%H:%M:%S"];

/// Converts between a domain's values and their textual catalog representation.
///
/// Catalogs quote textual values with single quotes, doubling any embedded quote. Quoting is optional for every type
/// and is removed before parsing.
pub trait ValueParser: Domain {
    /// Parses a value from its catalog text.
    ///
    /// # Errors
    ///
    /// If the text is not a valid value of the domain, an error is returned.
    fn parse(&self, text: &str) -> Result<Self::Value, ParseError>;

    /// Renders a value as text.
    fn render(&self, value: &Self::Value) -> String;
}

/// Removes catalog quoting from a value, if present.
fn unquote(text: &str) -> Cow<'_, str> {
    match text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) if inner.contains("''") => Cow::Owned(inner.replace("''", "'")),
        Some(inner) => Cow::Borrowed(inner),
        None => Cow::Borrowed(text),
    }
}

fn invalid<D: Domain>(domain: &D, text: &str, reason: impl ToString) -> ParseError {
    InvalidValue {
        domain: domain.name(),
        text,
        reason: reason.to_string(),
    }
    .build()
}

impl ValueParser for IntegerDomain {
    fn parse(&self, text: &str) -> Result<i64, ParseError> {
        unquote(text.trim()).trim().parse().map_err(|e| invalid(self, text, e))
    }

    fn render(&self, value: &i64) -> String {
        value.to_string()
    }
}

impl ValueParser for DecimalDomain {
    fn parse(&self, text: &str) -> Result<Decimal, ParseError> {
        let unquoted = unquote(text.trim());
        let value = Decimal::from_str(unquoted.trim())
            .or_else(|_| Decimal::from_scientific(unquoted.trim()))
            .map_err(|e| invalid(self, text, e))?;

        Ok(self.normalize(&value))
    }

    fn render(&self, value: &Decimal) -> String {
        self.normalize(value).to_string()
    }
}

impl ValueParser for DateDomain {
    fn parse(&self, text: &str) -> Result<NaiveDate, ParseError> {
        let unquoted = unquote(text.trim());
        let unquoted = unquoted.trim();

        if let Ok(date) = NaiveDate::parse_from_str(unquoted, DATE_FORMAT) {
            return Ok(date);
        }

        // Some catalogs report dates with a time of day attached, which carries no information at day granularity.
        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(unquoted, format).ok())
            .map(|dt| dt.date())
            .ok_or_else(|| invalid(self, text, "expected a date in YYYY-MM-DD form"))
    }

    fn render(&self, value: &NaiveDate) -> String {
        value.format(DATE_FORMAT).to_string()
    }
}

impl ValueParser for CharDomain {
    fn parse(&self, text: &str) -> Result<char, ParseError> {
        let unquoted = unquote(text);
        let mut chars = unquoted.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            (None, _) => Err(invalid(self, text, "expected a single character, got none")),
            (Some(_), Some(_)) => Err(invalid(self, text, "expected a single character, got several")),
        }
    }

    fn render(&self, value: &char) -> String {
        value.to_string()
    }
}

impl ValueParser for StringDomain {
    fn parse(&self, text: &str) -> Result<String, ParseError> {
        // Blanks are significant in strings, so only the quotes are removed.
        Ok(unquote(text).into_owned())
    }

    fn render(&self, value: &String) -> String {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoting() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("'it''s'"), "it's");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("abc"), "abc");
        assert_eq!(unquote("'"), "'");
    }

    #[test]
    fn integers() {
        let d = IntegerDomain;
        assert_eq!(d.parse("42").unwrap(), 42);
        assert_eq!(d.parse(" -7 ").unwrap(), -7);
        assert_eq!(d.parse("'12'").unwrap(), 12);
        assert!(d.parse("1.5").is_err());
        assert!(d.parse("").is_err());
        assert_eq!(d.render(&-3), "-3");
    }

    #[test]
    fn decimals_are_normalized() {
        let d = DecimalDomain::new(2);
        let v = d.parse("1.5").unwrap();
        assert_eq!(d.render(&v), "1.50");
        assert_eq!(v.scale(), 2);
        assert_eq!(d.render(&d.parse("'003.25'").unwrap()), "3.25");
        assert_eq!(d.render(&d.parse("1.5E1").unwrap()), "15.00");
        assert!(d.parse("abc").is_err());
    }

    #[test]
    fn dates() {
        let d = DateDomain;
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(d.parse("2024-01-10").unwrap(), expected);
        assert_eq!(d.parse("'2024-01-10'").unwrap(), expected);
        assert_eq!(d.parse("2024-01-10 13:45:00").unwrap(), expected);
        assert_eq!(d.parse("2024-01-10-13.45.00").unwrap(), expected);
        assert!(d.parse("10/01/2024").is_err());
        assert_eq!(d.render(&expected), "2024-01-10");
    }

    #[test]
    fn chars() {
        let d = CharDomain;
        assert_eq!(d.parse("'A'").unwrap(), 'A');
        assert_eq!(d.parse("' '").unwrap(), ' ');
        assert_eq!(d.parse("''''").unwrap(), '\'');
        assert!(d.parse("''").is_err());
        assert!(d.parse("'AB'").is_err());
    }

    #[test]
    fn strings_keep_blanks() {
        let d = StringDomain;
        assert_eq!(d.parse("'ab  '").unwrap(), "ab  ");
        assert_eq!(d.parse("plain").unwrap(), "plain");
        assert_eq!(d.render(&"x y".to_string()), "x y");
    }

    #[test]
    fn errors_name_the_domain() {
        let err = IntegerDomain.parse("nope").unwrap_err();
        assert!(err.to_string().contains("integer"));
        assert!(err.to_string().contains("nope"));
    }
}
