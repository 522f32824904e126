mod cli;
mod commands;
mod config;
mod modules;
mod paths;
mod progress;
mod slug;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Eksctl(cmd) => commands::eksctl::run(cmd),
        Command::Kubectl(cmd) => commands::kubectl::run(cmd),
        Command::Gradle(cmd) => commands::gradle::run(cmd),
        Command::Pulumi(cmd) => commands::pulumi::run(cmd),
        Command::UpdateImage(args) => commands::update::run(args),
        Command::Previews(cmd) => commands::previews::run(cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
