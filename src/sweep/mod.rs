//! Work dispatch across the installation worker pool
//!
//! The dispatcher owns the fan-out: discovered descriptor paths are pushed
//! into a bounded channel and drained by a fixed set of worker threads, each
//! delivering every received task to the installer exactly once. Workers
//! journal and count each outcome and advance the shared progress bar by one
//! unit per completed task. The thread scope joins every worker before the
//! counters are read, so the final report always sees fully settled totals.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};
use indicatif::ProgressBar;

pub mod counters;
pub mod journal;
pub mod strategy;

pub use counters::SweepCounters;
pub use journal::InstallJournal;
pub use strategy::ExecutionStrategy;

use crate::installer::DriverInstaller;

/// Final tallies for one sweep, read only after all workers have finished.
#[derive(Debug)]
pub struct SweepReport {
    pub attempted: usize,
    pub installed: usize,
    pub failed: usize,
    pub duration: Duration,
}

/// Distributes driver tasks to installation workers.
pub struct Dispatcher<'a> {
    installer: &'a DriverInstaller,
    journal: Option<&'a InstallJournal>,
    progress: Option<&'a ProgressBar>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        installer: &'a DriverInstaller,
        journal: Option<&'a InstallJournal>,
        progress: Option<&'a ProgressBar>,
    ) -> Self {
        Self {
            installer,
            journal,
            progress,
        }
    }

    /// Run every task to completion under the given strategy.
    pub fn run(&self, tasks: Vec<PathBuf>, strategy: &ExecutionStrategy) -> Result<SweepReport> {
        let started = Instant::now();
        let attempted = tasks.len();
        let counters = SweepCounters::new();

        match strategy {
            ExecutionStrategy::Sequential => {
                for path in &tasks {
                    self.process(path, &counters);
                }
            }
            ExecutionStrategy::Parallel { workers } => {
                self.run_pool(tasks, *workers, &counters)?;
            }
        }

        let (installed, failed) = counters.totals();
        Ok(SweepReport {
            attempted,
            installed,
            failed,
            duration: started.elapsed(),
        })
    }

    /// Install one driver, then journal, count, and tick progress.
    fn process(&self, path: &Path, counters: &SweepCounters) {
        let outcome = self.installer.install(path);
        if let Some(journal) = self.journal {
            journal.record(&outcome);
        }
        counters.record(&outcome);
        if let Some(bar) = self.progress {
            bar.inc(1);
        }
    }

    fn run_pool(&self, tasks: Vec<PathBuf>, workers: usize, counters: &SweepCounters) -> Result<()> {
        let worker_count = workers.clamp(1, tasks.len().max(1));
        let (task_tx, task_rx): (Sender<PathBuf>, Receiver<PathBuf>) = bounded(worker_count * 2);

        crossbeam::thread::scope(|s| {
            for _ in 0..worker_count {
                let task_rx = task_rx.clone();
                s.spawn(move |_| {
                    while let Ok(path) = task_rx.recv() {
                        self.process(&path, counters);
                    }
                });
            }
            drop(task_rx);

            // Feed the pool; the bounded channel applies backpressure
            for path in tasks {
                if task_tx.send(path).is_err() {
                    break; // Workers dropped
                }
            }
            drop(task_tx);

            // Leaving the scope joins every worker: the barrier before
            // counters are read
        })
        .map_err(|_| anyhow::anyhow!("worker thread panicked during sweep"))?;

        Ok(())
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_tasks(count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| PathBuf::from(format!("{i}.inf"))).collect()
    }

    fn stub_installer(program: &str) -> DriverInstaller {
        DriverInstaller::new(program, Vec::new(), None)
    }

    #[test]
    fn test_all_tasks_succeed() {
        let installer = stub_installer("true");
        let dispatcher = Dispatcher::new(&installer, None, None);
        let report = dispatcher
            .run(fake_tasks(20), &ExecutionStrategy::Parallel { workers: 4 })
            .unwrap();

        assert_eq!(report.attempted, 20);
        assert_eq!(report.installed, 20);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_unavailable_installer_fails_every_task() {
        let installer = stub_installer("infsweep-no-such-utility");
        let dispatcher = Dispatcher::new(&installer, None, None);
        let report = dispatcher
            .run(fake_tasks(10), &ExecutionStrategy::Parallel { workers: 4 })
            .unwrap();

        assert_eq!(report.installed, 0);
        assert_eq!(report.failed, 10);
    }

    #[test]
    fn test_mixed_outcomes_are_classified_per_task() {
        let installer = DriverInstaller::new(
            "sh",
            vec!["-c".into(), "case {path} in *ok*) exit 0;; *) exit 1;; esac".into()],
            None,
        );
        let mut tasks: Vec<PathBuf> = (0..6).map(|i| PathBuf::from(format!("ok-{i}.inf"))).collect();
        tasks.extend((0..4).map(|i| PathBuf::from(format!("bad-{i}.inf"))));

        let dispatcher = Dispatcher::new(&installer, None, None);
        let report = dispatcher
            .run(tasks, &ExecutionStrategy::Parallel { workers: 3 })
            .unwrap();

        assert_eq!(report.installed, 6);
        assert_eq!(report.failed, 4);
    }

    #[test]
    fn test_counters_settle_under_stress() {
        let installer = stub_installer("true");
        let dispatcher = Dispatcher::new(&installer, None, None);
        let report = dispatcher
            .run(fake_tasks(200), &ExecutionStrategy::Parallel { workers: 8 })
            .unwrap();

        assert_eq!(report.installed + report.failed, 200);
    }

    #[test]
    fn test_progress_advances_once_per_task() {
        let installer = stub_installer("false");
        let bar = ProgressBar::hidden();
        let dispatcher = Dispatcher::new(&installer, None, Some(&bar));
        dispatcher
            .run(fake_tasks(15), &ExecutionStrategy::Parallel { workers: 4 })
            .unwrap();

        // Failures still advance the indicator
        assert_eq!(bar.position(), 15);
    }

    #[test]
    fn test_sequential_strategy_matches_parallel_results() {
        let installer = stub_installer("true");
        let bar = ProgressBar::hidden();
        let dispatcher = Dispatcher::new(&installer, None, Some(&bar));
        let report = dispatcher
            .run(fake_tasks(5), &ExecutionStrategy::Sequential)
            .unwrap();

        assert_eq!(report.installed, 5);
        assert_eq!(report.failed, 0);
        assert_eq!(bar.position(), 5);
    }

    #[test]
    fn test_every_attempt_is_journaled() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("install.log");
        let journal = InstallJournal::create(&log_path).unwrap();

        let installer = stub_installer("true");
        let dispatcher = Dispatcher::new(&installer, Some(&journal), None);
        dispatcher
            .run(fake_tasks(12), &ExecutionStrategy::Parallel { workers: 4 })
            .unwrap();
        drop(journal);

        let contents = fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 12);
        assert!(contents.lines().all(|l| l.ends_with("installed successfully")));
    }

    #[test]
    fn test_empty_task_list_reports_zero() {
        let installer = stub_installer("true");
        let dispatcher = Dispatcher::new(&installer, None, None);
        let report = dispatcher
            .run(Vec::new(), &ExecutionStrategy::Parallel { workers: 4 })
            .unwrap();

        assert_eq!(report.attempted, 0);
        assert_eq!(report.installed, 0);
        assert_eq!(report.failed, 0);
    }
}
