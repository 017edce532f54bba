/// Adapters for callers written against the sentinel contract: a negative
/// count for a failed update and an absent row set for a failed query.
///
/// The failure has already been logged by the executor when these run.

use crate::core::{Result, RowSet};

/// Count reported for a failed update.
pub const FAILED_UPDATE: i64 = -1;

pub trait SentinelExt {
    type Sentinel;

    /// Collapses the result into the sentinel form.
    fn or_sentinel(self) -> Self::Sentinel;
}

impl SentinelExt for Result<usize> {
    type Sentinel = i64;

    fn or_sentinel(self) -> i64 {
        match self {
            Ok(count) => i64::try_from(count).unwrap_or(i64::MAX),
            Err(_) => FAILED_UPDATE,
        }
    }
}

impl SentinelExt for Result<Option<RowSet>> {
    type Sentinel = Option<RowSet>;

    /// Failure and "no result" both become `None`.
    fn or_sentinel(self) -> Option<RowSet> {
        self.ok().flatten()
    }
}
