//! # Infsweep - bulk driver package installation
//!
//! Infsweep sweeps a directory tree for driver descriptor files (`.inf` by
//! default) and feeds every match through the system driver-installation
//! utility, one subprocess per package, across a bounded pool of worker
//! threads. Each attempt is appended to a shared log file and tallied into
//! aggregate installed/failed counts reported at the end of the run.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install every driver package under the current directory
//! infsweep install
//!
//! # Preview what a sweep would install
//! infsweep list
//!
//! # Eight workers, custom log location, fail the process on any bad driver
//! infsweep install C:\drivers --workers 8 --log-file sweep.log --strict
//! ```
//!
//! ## Configuration
//!
//! Settings layer from embedded defaults, through `infsweep.toml` in the
//! working directory (or `--config FILE`), to `INFSWEEP_*` environment
//! variables. The installer utility itself is configurable, so the sweep can
//! drive any command-line tool that reports success through its exit code:
//!
//! ```toml
//! [installer]
//! program = "pnputil"
//! args = ["/add-driver", "{path}", "/install"]
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod installer;
pub mod sweep;

pub use cli::{Cli, Output};
pub use config::SweepConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
