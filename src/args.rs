use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "F1 Elo Processor",
    long_about = "Replays historical race results in order and produces driver and constructor ratings"
)]
pub struct Args {
    /// JSON dump holding the driver, constructor and lineage tables plus every event
    #[arg(short, long, env = "EVENTS_PATH", help = "Path to the event dump")]
    pub input: PathBuf,

    #[arg(
        short,
        long,
        env = "SNAPSHOT_PATH",
        default_value = "ratings.json",
        help = "Where the rating snapshot is written"
    )]
    pub output: PathBuf,

    /// TOML file overriding any engine default. Omitted sections keep their defaults.
    #[arg(short, long, env = "ENGINE_CONFIG", help = "Path to the engine configuration")]
    pub config: Option<PathBuf>,

    /// Skips the season-boundary pool shift regardless of the configuration file
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_normalize: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
