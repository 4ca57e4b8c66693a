mod check;
mod dump;

pub use check::*;
use clap::Subcommand;
pub use dump::*;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration and exit
    Check {
        /// Path to the config file
        #[arg(long, default_value = "/etc/tallyd/tallyd.toml")]
        config: PathBuf,

        /// Print problems without colors
        #[arg(short, long)]
        plain: bool,
    },

    /// Print the configuration with defaults applied
    Dump {
        /// Path to the config file
        #[arg(long, default_value = "/etc/tallyd/tallyd.toml")]
        config: PathBuf,

        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Check { config, plain } => check(config, plain),
        ConfigCmd::Dump { config, json } => dump(config, json),
    }
}
