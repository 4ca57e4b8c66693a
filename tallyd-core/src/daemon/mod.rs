//! The daemon loop: one round per interval until the process is stopped.

mod pid;

pub use pid::{PidFile, remove_pid};

use crate::conf::RuntimeConfig;
use crate::tail::RoundProcessor;
use anyhow::Result;
use chrono::Local;
use std::time::{Duration, Instant};

/// Run rounds forever, or a single round with `once`.
///
/// Ctrl-C or SIGTERM stops the process at once; the round in flight is not
/// dumped.
pub fn run(config: RuntimeConfig, once: bool) -> Result<()> {
    // Best-effort: a daemon without a pid file still runs.
    let _pid_file = config
        .pid_file
        .as_deref()
        .and_then(|path| match PidFile::create(path) {
            Ok(pid_file) => {
                tracing::info!(pid_file = %path.display(), "pid file written");
                Some(pid_file)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    pid_file = %path.display(),
                    "failed to write pid file; continuing"
                );
                None
            }
        });

    // Signal exits skip destructors
    if let Some(pid_file) = config.pid_file.clone() {
        ctrlc::set_handler(move || {
            tracing::info!("shutdown requested, removing pid file");
            remove_pid(&pid_file);
            std::process::exit(0);
        })?;
    }

    let mut processor = RoundProcessor::new(&config, Local::now().naive_local());
    tracing::info!(
        streams = config.streams.len(),
        interval_secs = config.interval.as_secs(),
        "daemon started"
    );

    loop {
        let started = Instant::now();
        processor.run_round(Local::now().naive_local());

        if once {
            break;
        }

        let pause = sleep_duration(config.interval, started.elapsed());
        tracing::debug!(sleep_ms = pause.as_millis() as u64, "waiting for the next round");
        std::thread::sleep(pause);
    }

    Ok(())
}

/// Remainder of the interval; zero when the round overran it.
pub fn sleep_duration(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_covers_the_rest_of_the_interval() {
        let interval = Duration::from_secs(300);

        assert_eq!(
            sleep_duration(interval, Duration::from_millis(1500)),
            Duration::from_millis(298_500)
        );
    }

    #[test]
    fn overrunning_round_does_not_sleep() {
        let interval = Duration::from_secs(300);

        assert_eq!(sleep_duration(interval, Duration::from_secs(301)), Duration::ZERO);
        assert_eq!(sleep_duration(interval, interval), Duration::ZERO);
    }
}
