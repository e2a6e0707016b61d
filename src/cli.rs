//! Command-line entry point for the MCP server binary.
//!
//! The server speaks MCP exclusively over stdio, so this is deliberately
//! thin: a config path override and a verbosity knob, nothing else. All
//! real functionality is invoked by the AI host through MCP tool calls, not
//! through CLI subcommands.

use std::path::PathBuf;

#[derive(clap::Parser)]
#[command(name = "syncable-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP tool server for containerizing and deploying a repository")]
pub struct Cli {
    /// Path to the project/workspace root. Defaults to the current directory.
    #[arg(value_name = "PROJECT_PATH")]
    pub path: Option<PathBuf>,

    /// Path to a `.syncable.toml` config file, overriding the local/global lookup.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Initialize logging to stderr. Stdout is reserved for the MCP stdio
    /// transport; anything this process writes to stdout that isn't a
    /// framed MCP message corrupts the session.
    pub fn init_logging(&self) {
        let level = if self.quiet {
            log::LevelFilter::Error
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .init();
    }
}
