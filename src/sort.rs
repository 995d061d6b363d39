//! Index-permutation sorting used by every ranked query.
//!
//! Rankings never move records around; they sort a list of record positions
//! with a caller-supplied `less` predicate. Ordering among elements the
//! predicate considers equal is unspecified, so callers that need a stable
//! result add a secondary key to the predicate.

use std::cmp::Ordering;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sorts `indices` in place so that no later element is `less` than an
/// earlier one. `less` must be a strict weak ordering.
pub fn sort_indices_by<F>(indices: &mut [usize], mut less: F)
where
    F: FnMut(usize, usize) -> bool,
{
    indices.sort_unstable_by(|&a, &b| {
        if less(a, b) {
            Ordering::Less
        } else if less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
}

/// Compares two optional metrics so that present values follow `direction`
/// and missing values (including NaN) always come after present ones.
pub fn missing_last(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => match direction {
            SortDirection::Asc => left.total_cmp(&right),
            SortDirection::Desc => right.total_cmp(&left),
        },
    }
}

/// Year ordering for country buckets: ascending, missing years last.
pub fn year_missing_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => left.cmp(&right),
    }
}
