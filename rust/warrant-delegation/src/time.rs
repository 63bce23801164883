//! Validity windows of delegations.

use std::{
    fmt,
    ops::{Bound, RangeBounds},
};
use thiserror::Error;

/// Seconds since the UNIX epoch.
pub type Timestamp = u64;

/// A time range during which a delegation (or a whole chain) is valid.
///
/// `not_before` is the lower bound and `expiration` the upper bound, both
/// inclusive. [`Bound::Unbounded`] is used for open ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Earliest time this range is valid.
    pub not_before: Bound<Timestamp>,

    /// Latest time this range is valid.
    pub expiration: Bound<Timestamp>,
}

/// A time bound was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The validation time is past the expiration.
    #[error("Expired on {expiration}")]
    Expired {
        /// The expiration that was exceeded.
        expiration: Timestamp,
    },

    /// The validation time is before the not-before bound.
    #[error("Not valid before {not_before}")]
    NotValidBefore {
        /// The bound that has not been reached yet.
        not_before: Timestamp,
    },
}

impl TimeRange {
    /// An unbounded time range (no constraints).
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            not_before: Bound::Unbounded,
            expiration: Bound::Unbounded,
        }
    }

    /// Creates a time range from optional `not_before` and `expiration` bounds.
    #[must_use]
    pub const fn new(not_before: Option<Timestamp>, expiration: Option<Timestamp>) -> Self {
        Self {
            not_before: match not_before {
                Some(t) => Bound::Included(t),
                None => Bound::Unbounded,
            },
            expiration: match expiration {
                Some(t) => Bound::Included(t),
                None => Bound::Unbounded,
            },
        }
    }

    /// Returns `true` if this range is non-empty (a valid time exists within it).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (self.not_before, self.expiration) {
            (Bound::Included(nbf), Bound::Included(exp)) => nbf <= exp,
            _ => true,
        }
    }

    /// Compute the intersection of two time ranges.
    ///
    /// The resulting `not_before` is the later of the two lower bounds,
    /// and the resulting `expiration` is the earlier of the two upper bounds.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let not_before = match (self.not_before, other.not_before) {
            (Bound::Included(a), Bound::Included(b)) => Bound::Included(a.max(b)),
            (Bound::Unbounded, bound) | (bound, Bound::Unbounded) => bound,
            (Bound::Excluded(a), Bound::Excluded(b)) => Bound::Excluded(a.max(b)),
            (Bound::Excluded(a), Bound::Included(b)) | (Bound::Included(b), Bound::Excluded(a)) => {
                if a >= b {
                    Bound::Excluded(a)
                } else {
                    Bound::Included(b)
                }
            }
        };
        let expiration = match (self.expiration, other.expiration) {
            (Bound::Included(a), Bound::Included(b)) => Bound::Included(a.min(b)),
            (Bound::Unbounded, bound) | (bound, Bound::Unbounded) => bound,
            (Bound::Excluded(a), Bound::Excluded(b)) => Bound::Excluded(a.min(b)),
            (Bound::Excluded(a), Bound::Included(b)) | (Bound::Included(b), Bound::Excluded(a)) => {
                if a <= b {
                    Bound::Excluded(a)
                } else {
                    Bound::Included(b)
                }
            }
        };
        Self {
            not_before,
            expiration,
        }
    }

    /// Checks that `now` falls inside this range.
    ///
    /// Expiration is checked first, so a range that is both expired and not
    /// yet valid reports [`TimeError::Expired`].
    ///
    /// # Errors
    ///
    /// Returns the violated bound.
    pub fn check(&self, now: Timestamp) -> Result<(), TimeError> {
        match self.expiration {
            Bound::Included(expiration) if now > expiration => {
                return Err(TimeError::Expired { expiration });
            }
            Bound::Excluded(expiration) if now >= expiration => {
                return Err(TimeError::Expired { expiration });
            }
            _ => {}
        }
        match self.not_before {
            Bound::Included(not_before) if now < not_before => {
                Err(TimeError::NotValidBefore { not_before })
            }
            Bound::Excluded(not_before) if now <= not_before => {
                Err(TimeError::NotValidBefore { not_before })
            }
            _ => Ok(()),
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RangeBounds<Timestamp> for TimeRange {
    fn start_bound(&self) -> Bound<&Timestamp> {
        self.not_before.as_ref()
    }

    fn end_bound(&self) -> Bound<&Timestamp> {
        self.expiration.as_ref()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.not_before {
            Bound::Included(nbf) | Bound::Excluded(nbf) => write!(f, "{nbf}")?,
            Bound::Unbounded => {}
        }
        write!(f, "..")?;
        match self.expiration {
            Bound::Included(exp) => write!(f, "={exp}"),
            Bound::Excluded(exp) => write!(f, "{exp}"),
            Bound::Unbounded => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_accepts_times_within_bounds() {
        let range = TimeRange::new(Some(100), Some(200));
        assert_eq!(range.check(100), Ok(()));
        assert_eq!(range.check(150), Ok(()));
        assert_eq!(range.check(200), Ok(()));
        assert!(range.contains(&150));
    }

    #[test]
    fn it_reports_expiration() {
        let range = TimeRange::new(None, Some(200));
        assert_eq!(range.check(201), Err(TimeError::Expired { expiration: 200 }));
    }

    #[test]
    fn it_reports_not_before() {
        let range = TimeRange::new(Some(100), None);
        assert_eq!(
            range.check(99),
            Err(TimeError::NotValidBefore { not_before: 100 })
        );
    }

    #[test]
    fn it_intersects_to_the_narrowest_window() {
        let a = TimeRange::new(Some(100), Some(300));
        let b = TimeRange::new(Some(150), None);
        let c = TimeRange::new(None, Some(250));
        let range = a.intersect(b).intersect(c);
        assert_eq!(range, TimeRange::new(Some(150), Some(250)));
        assert_eq!(range.to_string(), "150..=250");
        assert!(range.is_valid());
    }

    #[test]
    fn it_detects_empty_windows() {
        let range = TimeRange::new(Some(300), None).intersect(TimeRange::new(None, Some(200)));
        assert!(!range.is_valid());
    }

    #[test]
    fn it_leaves_unbounded_ranges_open() {
        assert_eq!(TimeRange::unbounded().check(u64::MAX), Ok(()));
        assert_eq!(TimeRange::unbounded().to_string(), "..");
    }
}
