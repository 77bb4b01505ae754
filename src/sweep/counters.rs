//! Shared installed/failed tallies updated atomically across workers

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::installer::InstallOutcome;

/// Aggregate counters shared by every worker in a sweep.
///
/// Invariant: `installed() + failed()` equals the number of outcomes recorded
/// so far, and equals the total task count once the pool has been joined.
#[derive(Debug, Default)]
pub struct SweepCounters {
    installed: AtomicUsize,
    failed: AtomicUsize,
}

impl SweepCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &InstallOutcome) {
        if outcome.succeeded {
            self.installed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn installed(&self) -> usize {
        self.installed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn totals(&self) -> (usize, usize) {
        (self.installed(), self.failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    fn outcome(succeeded: bool) -> InstallOutcome {
        InstallOutcome {
            path: PathBuf::from("driver.inf"),
            succeeded,
            detail: (!succeeded).then(|| "exit status: 1".to_string()),
        }
    }

    #[test]
    fn test_record_classifies_outcomes() {
        let counters = SweepCounters::new();
        counters.record(&outcome(true));
        counters.record(&outcome(true));
        counters.record(&outcome(false));

        assert_eq!(counters.totals(), (2, 1));
    }

    #[test]
    fn test_no_lost_updates_under_contention() {
        let counters = Arc::new(SweepCounters::new());
        let threads = 8;
        let per_thread = 500;

        let handles: Vec<_> = (0..threads)
            .map(|worker| {
                let counters = counters.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        counters.record(&outcome((worker + i) % 2 == 0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let (installed, failed) = counters.totals();
        assert_eq!(installed + failed, threads * per_thread);
    }
}
