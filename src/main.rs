use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::*;

use crate::{
    fs::FsConfig,
    shell::{run_script, start_shell},
};

mod disk;
mod fs;
mod logger;
mod shell;
mod utils;

/// Contiguous-allocation block storage simulator
#[derive(Debug, Parser)]
#[command(name = "blockfs", version, about)]
struct Cli {
    /// TOML file with block_size, disk_size, max_files, max_name_len, max_write_len
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Block size in bytes (overrides the config file)
    #[arg(long)]
    block_size: Option<usize>,

    /// Total medium size in bytes (overrides the config file)
    #[arg(long)]
    disk_size: Option<u64>,

    /// Run commands from a file instead of the interactive shell
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// error, warn, info, debug or trace (default: $BLOCKFS_LOG or warn)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_from(cli.log_level.as_deref()));

    let mut config = match &cli.config {
        Some(path) => match FsConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {}", "❌ Error:".red().bold(), e);
                return ExitCode::FAILURE;
            }
        },
        None => FsConfig::default(),
    };
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(disk_size) = cli.disk_size {
        config.disk_size = disk_size;
    }

    let result = match &cli.script {
        Some(path) => run_script(config, path),
        None => start_shell(config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
