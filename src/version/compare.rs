//! Total-order version comparison.
//!
//! Parsing rules:
//!
//! - The first token starting with a digit is used; any prefix such as
//!   `v`, `Python ` or `MSFragger-` is skipped.
//! - The token is split on `.`, `-`, `_` and on digit/letter boundaries
//!   into numeric and text segments (`3.4rc1` becomes `3`, `4`, `rc`, `1`).
//! - A leading 8-digit `YYYYMMDD` token makes the version [`Scheme::Dated`].
//!   Dated builds order before every dotted version.
//!
//! Ordering rules, applied segment by segment:
//!
//! - Missing segments count as `0` against numbers, so `3.4 == 3.4.0`.
//! - Text orders below numbers and below a missing segment, so
//!   `3.4-rc1 < 3.4 < 3.4.1`. Text compares case-insensitively.
//! - Input with no digits at all is unbounded-least: it compares less than
//!   every parsable version and equal to other unparsable input.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

use super::extract::extract_version;

/// Version numbering family.
///
/// Variant order is significant: date builds predate dotted releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scheme {
    /// Date-stamped builds such as `20180924`.
    Dated,
    /// Dotted releases such as `3.9.0` or `3.4-RC1`.
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Num(u64),
    Text(String),
}

/// Comparison key for one segment slot. `None` is a missing segment.
fn slot_key(segment: Option<&Segment>) -> (u8, u64, &str) {
    match segment {
        Some(Segment::Text(text)) => (0, 0, text.as_str()),
        Some(Segment::Num(n)) => (1, *n, ""),
        None => (1, 0, ""),
    }
}

/// A parsed version.
///
/// Equality and hashing follow the ordering, so `3.4` and `3.4.0` are the
/// same version even though they print differently.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    scheme: Scheme,
    segments: Vec<Segment>,
}

/// Returned by [`Version::from_str`] for input with no version token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' does not contain a version")]
pub struct UnparsableVersion(pub String);

impl Version {
    /// Parse `text`, returning `None` when it holds no version token.
    pub fn parse(text: &str) -> Option<Self> {
        let token = extract_version(text)?;
        let mut segments = Vec::new();
        for part in token.split(['.', '-', '_']).filter(|p| !p.is_empty()) {
            split_alnum(part, &mut segments);
        }

        let leading_digits = token.bytes().take_while(u8::is_ascii_digit).count();
        let scheme = match segments.first() {
            Some(Segment::Num(n)) if leading_digits == 8 && is_plausible_date(*n) => Scheme::Dated,
            _ => Scheme::Dotted,
        };

        while matches!(segments.last(), Some(Segment::Num(0))) {
            segments.pop();
        }

        Some(Self {
            raw: token.to_string(),
            scheme,
            segments,
        })
    }

    /// The version token as it appeared in the input.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The numbering family this version belongs to.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

/// Split `part` on digit/letter boundaries, appending segments.
fn split_alnum(part: &str, segments: &mut Vec<Segment>) {
    let mut current = String::new();
    let mut current_is_digit = None;

    for ch in part.chars() {
        let is_digit = ch.is_ascii_digit();
        if current_is_digit.is_some_and(|d| d != is_digit) {
            segments.push(make_segment(&current));
            current.clear();
        }
        current_is_digit = Some(is_digit);
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(make_segment(&current));
    }
}

fn make_segment(text: &str) -> Segment {
    match text.parse::<u64>() {
        Ok(n) => Segment::Num(n),
        // Digit runs that overflow u64 saturate.
        Err(_) if text.bytes().all(|b| b.is_ascii_digit()) => Segment::Num(u64::MAX),
        Err(_) => Segment::Text(text.to_ascii_lowercase()),
    }
}

fn is_plausible_date(n: u64) -> bool {
    let year = n / 10_000;
    let month = (n / 100) % 100;
    let day = n % 100;
    (1970..=2999).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scheme.cmp(&other.scheme).then_with(|| {
            let len = self.segments.len().max(other.segments.len());
            (0..len)
                .map(|i| slot_key(self.segments.get(i)).cmp(&slot_key(other.segments.get(i))))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Trailing zeros are already stripped, so equal versions share
        // identical segment lists.
        self.scheme.hash(state);
        self.segments.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for Version {
    type Err = UnparsableVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnparsableVersion(s.to_string()))
    }
}

/// Compare two version strings.
///
/// Never fails: unparsable input sorts below everything parsable.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Whether `found` satisfies the lower bound `minimum`.
///
/// A missing version never does.
pub fn meets_minimum(found: Option<&str>, minimum: &str) -> bool {
    match found {
        Some(found) => compare(found, minimum) != Ordering::Less,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments_compare_numerically() {
        assert_eq!(compare("3.10.0", "3.9.0"), Ordering::Greater);
        assert_eq!(compare("3.9.0", "3.10.0"), Ordering::Less);
        assert_eq!(compare("10.0", "9.99.99"), Ordering::Greater);
    }

    #[test]
    fn trailing_zeros_are_insignificant() {
        assert_eq!(compare("3.4", "3.4.0"), Ordering::Equal);
        assert_eq!(Version::parse("3.4"), Version::parse("3.4.0.0"));
        assert_eq!(compare("3.4.0.1", "3.4"), Ordering::Greater);
    }

    #[test]
    fn prerelease_orders_below_release() {
        assert_eq!(compare("3.4-rc1", "3.4"), Ordering::Less);
        assert_eq!(compare("3.4-RC1", "3.4.1"), Ordering::Less);
        assert_eq!(compare("3.4-rc2", "3.4-rc1"), Ordering::Greater);
        assert_eq!(compare("3.4-RC1", "3.4-rc1"), Ordering::Equal);
        assert_eq!(compare("3.4rc1", "3.4-rc1"), Ordering::Equal);
    }

    #[test]
    fn dates_compare_chronologically() {
        assert_eq!(compare("20180101", "20180924"), Ordering::Less);
        assert_eq!(compare("20190222", "20180924"), Ordering::Greater);
    }

    #[test]
    fn dated_builds_predate_dotted_releases() {
        let dated = Version::parse("20190222").unwrap();
        assert_eq!(dated.scheme(), Scheme::Dated);
        assert_eq!(compare("20190222", "2.0"), Ordering::Less);
        assert_eq!(compare("3.4", "20180924"), Ordering::Greater);
    }

    #[test]
    fn eight_digits_that_are_not_a_date_stay_dotted() {
        let v = Version::parse("99999999").unwrap();
        assert_eq!(v.scheme(), Scheme::Dotted);
    }

    #[test]
    fn prefixes_are_ignored() {
        assert_eq!(compare("Python 3.9.0", "3.9"), Ordering::Equal);
        assert_eq!(compare("MSFragger-20180924", "20180924"), Ordering::Equal);
        assert_eq!(compare("v2.1", "2.0"), Ordering::Greater);
    }

    #[test]
    fn unparsable_is_least() {
        assert_eq!(compare("garbled", "0.0.1"), Ordering::Less);
        assert_eq!(compare("", "20180101"), Ordering::Less);
        assert_eq!(compare("1", "???"), Ordering::Greater);
        assert_eq!(compare("", "garbled"), Ordering::Equal);
    }

    #[test]
    fn order_is_antisymmetric_and_transitive() {
        let samples = [
            "", "x", "0", "1", "1.0.1", "1.2-alpha", "1.2-beta", "1.2", "1.10", "2.0-rc1",
            "20180101", "20180924", "20190222", "3.9.0", "3.9.0.1", "99999999",
        ];
        for a in samples {
            for b in samples {
                assert_eq!(compare(a, b), compare(b, a).reverse(), "{a} vs {b}");
                for c in samples {
                    if compare(a, b).is_le() && compare(b, c).is_le() {
                        assert!(compare(a, c).is_le(), "{a} <= {b} <= {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn huge_numbers_do_not_panic() {
        assert_eq!(
            compare("1.99999999999999999999999", "1.2"),
            Ordering::Greater
        );
    }

    #[test]
    fn meets_minimum_requires_a_version() {
        assert!(meets_minimum(Some("3.9.0"), "3.9"));
        assert!(meets_minimum(Some("20180924"), "20180924"));
        assert!(!meets_minimum(Some("20180101"), "20180924"));
        assert!(!meets_minimum(None, "1.0"));
        assert!(!meets_minimum(Some("unknown"), "1.0"));
    }

    #[test]
    fn from_str_reports_unparsable_input() {
        let err = "no digits here".parse::<Version>().unwrap_err();
        assert_eq!(err, UnparsableVersion("no digits here".to_string()));
        let v: Version = "Python 3.11.4".parse().unwrap();
        assert_eq!(v.as_str(), "3.11.4");
        assert_eq!(v.to_string(), "3.11.4");
    }
}
