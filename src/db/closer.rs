/// Resource Release Module
///
/// Gives back the resources of one statement call. Each release is
/// attempted independently: a failure is logged and recorded, and the
/// caller moves on to the next resource.

use crate::core::{DaoError, ResourceKind};
use crate::db::driver::Release;
use tracing::{debug, warn};

/// Tracks the releases of one statement call.
///
/// Callers release in reverse acquisition order (cursor, statement,
/// connection). The borrow checker enforces that order: a cursor borrows
/// its statement and a statement borrows its connection.
#[derive(Debug, Default)]
pub struct ResourceCloser {
    released: Vec<ResourceKind>,
    failures: Vec<DaoError>,
}

impl ResourceCloser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases `resource`. Never fails; a release error is reported and
    /// kept in [`failures`](Self::failures).
    pub fn release<R: Release>(&mut self, kind: ResourceKind, resource: R) {
        self.released.push(kind);
        match resource.release() {
            Ok(()) => debug!(resource = %kind, "released"),
            Err(source) => {
                let err = DaoError::Release {
                    resource: kind,
                    source,
                };
                warn!(error = %err, "failed to release {}", kind);
                self.failures.push(err);
            }
        }
    }

    /// Resources released so far, in release order.
    pub fn released(&self) -> &[ResourceKind] {
        &self.released
    }

    /// Release failures, in release order.
    pub fn failures(&self) -> &[DaoError] {
        &self.failures
    }
}
