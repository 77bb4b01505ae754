//! The `list` command: discovery only, no installation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::cli::Output;
use crate::config::SweepConfig;
use crate::discovery;

#[derive(Args)]
pub struct ListArgs {
    /// Directory to sweep for driver packages
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

pub async fn execute(args: ListArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = SweepConfig::load(config_path)?;

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

    output.count("📦", "driver packages found", descriptors.len());
    for path in &descriptors {
        output.list_item(&path.display().to_string());
    }
    Ok(())
}
