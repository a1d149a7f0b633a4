//! Best-effort removal of generation events that left the rate window
//!
//! The sweeper never fails the caller. Each run reports what it did and
//! logs anything that went wrong; rows it could not delete are picked up
//! by a later run. Rows inside the window are never touched.

use std::sync::Arc;

use chrono::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::entities::{GenerationEvent, GEN_ROW_PREFIX};
use crate::domain::value_objects::SubjectKey;
use crate::repositories::{RowRange, RowStore};
use crate::services::clock::Clock;

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired rows found
    pub scanned: usize,
    /// Rows removed
    pub deleted: usize,
    /// Rows that could not be removed, or 1 when the scan itself failed
    pub failed: usize,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub struct EventSweeper {
    store: Arc<dyn RowStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl EventSweeper {
    pub fn new(store: Arc<dyn RowStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Delete every generation event of `subject` created before the window
    pub async fn sweep_expired_events(&self, subject: &SubjectKey) -> SweepReport {
        let window_start = self.clock.now() - self.window;
        let range = RowRange::new(GEN_ROW_PREFIX, GenerationEvent::lower_bound(window_start));
        let mut report = SweepReport::default();

        let expired = match self.store.scan(subject.as_str(), &range, None).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    subject = %subject.masked(),
                    error = %e,
                    event = "sweep_failed",
                    "Failed to scan expired generation events"
                );
                report.failed = 1;
                return report;
            }
        };
        report.scanned = expired.len();

        for row in expired {
            match self.store.delete(subject.as_str(), &row.row_key).await {
                // Already gone counts as done
                Ok(_) => report.deleted += 1,
                Err(e) => {
                    warn!(
                        subject = %subject.masked(),
                        row_key = %row.row_key,
                        error = %e,
                        event = "sweep_delete_failed",
                        "Failed to delete expired generation event"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.scanned > 0 {
            debug!(
                subject = %subject.masked(),
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                event = "otp_sweep_completed",
                "Swept expired generation events"
            );
        }

        report
    }

    /// Run a sweep on the runtime without waiting for it
    ///
    /// Must be called from within a tokio runtime. Dropping the returned
    /// handle detaches the task.
    pub fn spawn(self: &Arc<Self>, subject: SubjectKey) -> JoinHandle<SweepReport> {
        let sweeper = Arc::clone(self);
        tokio::spawn(async move { sweeper.sweep_expired_events(&subject).await })
    }
}
