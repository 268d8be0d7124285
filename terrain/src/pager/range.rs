//! Range specifier parsing and bounds resolution
//!
//! ```rust
//! use terrain::pager::{resolve_bounds, Bounds};
//!
//! assert_eq!(resolve_bounds(None, 10).unwrap(), Bounds::new(0, 9));
//! assert_eq!(resolve_bounds(Some("5-"), 10).unwrap(), Bounds::new(5, 9));
//! assert_eq!(resolve_bounds(Some("-5"), 10).unwrap(), Bounds::new(0, 5));
//! assert!(resolve_bounds(Some("3-2"), 10).is_err());
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<from>[0-9]*)-(?P<to>[0-9]*)$").expect("range pattern is valid")
});

/// A range specifier could not be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Did not match `<from>-<to>`
    #[error("malformed range specifier: {0:?}")]
    Malformed(String),

    /// `from` lies past `to`
    #[error("range {from}-{to} is inverted")]
    Inverted { from: i64, to: i64 },
}

/// Resolved inclusive bounds `[from, to]`
///
/// `to` may be `from - 1`, which is an empty range (an empty collection
/// with no range requested resolves to `[0, -1]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub from: i64,
    pub to: i64,
}

impl Bounds {
    #[must_use]
    pub const fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Number of positions the bounds span, saturating at `u64::MAX`
    #[must_use]
    pub fn span(&self) -> u64 {
        let span = i128::from(self.to) - i128::from(self.from) + 1;
        u64::try_from(span.max(0)).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.span() == 0
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A parsed `<from>-<to>` specifier, either side optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeSpec {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl RangeSpec {
    /// Parse a specifier. Anything but `^[0-9]*-[0-9]*$` is malformed.
    pub fn parse(spec: &str) -> Result<Self, RangeError> {
        let malformed = || RangeError::Malformed(spec.to_string());
        let captures = RANGE_PATTERN.captures(spec).ok_or_else(malformed)?;

        let side = |name: &str| -> Result<Option<i64>, RangeError> {
            match captures.name(name).map(|m| m.as_str()) {
                None | Some("") => Ok(None),
                Some(digits) => digits.parse().map(Some).map_err(|_| malformed()),
            }
        };

        Ok(Self {
            from: side("from")?,
            to: side("to")?,
        })
    }

    /// Fill in missing sides against `count` and check ordering
    ///
    /// The ordering check uses the requested `to`, before any clamping to the
    /// records that actually exist.
    pub fn resolve(&self, count: u64) -> Result<Bounds, RangeError> {
        let last = last_index(count);
        let from = self.from.unwrap_or(0);
        let to = self.to.unwrap_or(last);

        if from > to {
            return Err(RangeError::Inverted { from, to });
        }
        Ok(Bounds { from, to })
    }
}

/// Resolve an optional specifier against a collection size
///
/// An absent or blank specifier selects the whole collection.
pub fn resolve_bounds(range: Option<&str>, count: u64) -> Result<Bounds, RangeError> {
    match range {
        Some(spec) if !spec.trim().is_empty() => RangeSpec::parse(spec)?.resolve(count),
        _ => Ok(Bounds {
            from: 0,
            to: last_index(count),
        }),
    }
}

fn last_index(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX) - 1
}
