//! Execution strategy selection for the worker pool

use crate::config::{WorkerConfig, WorkerMode};

/// Sequential or parallel execution of the sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Pick a strategy for `task_count` tasks under the configured limits.
    pub fn for_workload(config: &WorkerConfig, task_count: usize) -> Self {
        match config.mode {
            WorkerMode::Sequential => ExecutionStrategy::Sequential,
            WorkerMode::Parallel | WorkerMode::Auto => {
                let max_workers =
                    Self::calculate_max_workers(config.max_threads, config.thread_percentage);
                // No point spinning up more workers than tasks
                let workers = max_workers.min(task_count.max(1));

                match config.mode {
                    WorkerMode::Parallel => ExecutionStrategy::Parallel { workers },
                    WorkerMode::Auto => {
                        Self::auto(task_count, config.min_tasks_for_parallel, workers)
                    }
                    WorkerMode::Sequential => unreachable!(),
                }
            }
        }
    }

    /// Threshold decision: small workloads skip the pool overhead entirely.
    pub fn auto(task_count: usize, min_tasks_for_parallel: usize, workers: usize) -> Self {
        if task_count >= min_tasks_for_parallel {
            ExecutionStrategy::Parallel { workers }
        } else {
            ExecutionStrategy::Sequential
        }
    }

    /// Calculate the worker cap from system resources and configured limits.
    ///
    /// Applies `thread_percentage` to the available cores, then the
    /// `max_threads` cap when it is non-zero, and never returns less than 1.
    pub fn calculate_max_workers(max_threads: usize, thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();
        let workers_by_percentage =
            std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        if max_threads > 0 {
            std::cmp::min(max_threads, workers_by_percentage)
        } else {
            workers_by_percentage
        }
    }

    /// Worker count this strategy will run with.
    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => *workers,
        }
    }
}
