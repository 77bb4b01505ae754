//! The `install` command: discover driver packages and install each one

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cli::Output;
use crate::config::SweepConfig;
use crate::discovery;
use crate::installer::DriverInstaller;
use crate::sweep::{Dispatcher, ExecutionStrategy, InstallJournal};

#[derive(Args)]
pub struct InstallArgs {
    /// Directory to sweep for driver packages
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Override the installer utility
    #[arg(long, value_name = "PROGRAM")]
    pub installer: Option<String>,

    /// Number of worker threads
    #[arg(short, long, conflicts_with = "sequential")]
    pub workers: Option<usize>,

    /// Install packages one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Disable the installation log file
    #[arg(long, conflicts_with = "log_file")]
    pub no_log: bool,

    /// Write the installation log to a custom path
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Exit non-zero when any driver fails to install
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: InstallArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let mut config = SweepConfig::load(config_path)?;
    if let Some(program) = args.installer {
        config.installer.program = program;
    }
    if args.no_log {
        config.log.enabled = false;
    }
    if let Some(path) = args.log_file {
        config.log.enabled = true;
        config.log.path = path;
    }
    let strict_exit = config.policy.strict_exit || args.strict;

    output.header(&format!("{} v{}", crate::PKG_NAME, crate::VERSION));

    let installer = DriverInstaller::from_config(&config.installer);
    if which::which(installer.program()).is_err() {
        output.warning(&format!(
            "installer utility '{}' not found on PATH, every install will fail",
            installer.program()
        ));
    }

    // A traversal error aborts the run before any install is attempted
    let descriptors = discovery::find_descriptors(
        &args.root,
        &config.discovery.extension,
        config.discovery.follow_symlinks,
    )?;
    if descriptors.is_empty() {
        output.info(&format!(
            "no .{} files found under {}",
            config.discovery.extension,
            args.root.display()
        ));
        return Ok(());
    }

    let strategy = if args.sequential {
        ExecutionStrategy::Sequential
    } else if let Some(workers) = args.workers {
        // An explicit worker count wins over the configured limits
        ExecutionStrategy::Parallel {
            workers: workers.clamp(1, descriptors.len()),
        }
    } else {
        ExecutionStrategy::for_workload(&config.workers, descriptors.len())
    };

    match &strategy {
        ExecutionStrategy::Sequential => {
            output.info(&format!("installing {} driver packages", descriptors.len()));
        }
        ExecutionStrategy::Parallel { workers } => {
            output.info(&format!(
                "installing {} driver packages using {workers} workers",
                descriptors.len()
            ));
        }
    }

    let journal = if config.log.enabled {
        Some(InstallJournal::create(&config.log.path)?)
    } else {
        None
    };
    let bar =
        (!output.is_quiet()).then(|| output.progress_bar(descriptors.len() as u64, "installing"));

    let dispatcher = Dispatcher::new(&installer, journal.as_ref(), bar.as_ref());
    let report = dispatcher.run(descriptors, &strategy)?;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    output.blank_line();
    output.tally(&format!("{} installed", report.installed), true);
    output.tally(&format!("{} failed", report.failed), report.failed == 0);
    output.success(&format!(
        "driver installation complete in {:.2}s",
        report.duration.as_secs_f64()
    ));
    if let Some(journal) = &journal {
        output.verbose(&format!("log written to {}", journal.path().display()));
    }

    if strict_exit && report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
