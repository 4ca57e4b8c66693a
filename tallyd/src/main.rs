use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tallyd_core::cli;
use tallyd_core::logging::init_cli_logging;

#[derive(Parser, Debug)]
#[command(
    name = "tallyd",
    version,
    about = "tallyd: access log statistics daemon"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tail the configured logs and dump statistics every interval
    Run {
        /// Path to the tallyd config file
        #[arg(long, default_value = "/etc/tallyd/tallyd.toml")]
        config: PathBuf,

        /// Run a single round and exit
        #[arg(long)]
        once: bool,
    },

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: cli::conf::ConfigCmd,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { config, once } => cli::run(config, once),
        Command::Config { cmd } => {
            init_cli_logging();
            cli::conf::run(cmd)
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "tallyd failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
