#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use tallyd_core::conf::ValidatedConfig;
use tallyd_core::tail::RoundProcessor;

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 8, 8)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// One combined-format line with `%D` latency in microseconds.
pub fn access_line(ts: NaiveDateTime, target: &str, status: u16, latency_us: u64) -> String {
    format!(
        "172.19.0.40 - - [{}] \"GET {target} HTTP/1.1\" {status} 8563 \"-\" \"Apache-HttpClient/4.2.1 (java 1.5)\" {latency_us}\n",
        ts.format("%d/%b/%Y:%H:%M:%S +0200")
    )
}

/// A processor whose first round is the interval ending at `first_round`.
pub fn processor(config: &ValidatedConfig, first_round: NaiveDateTime) -> RoundProcessor {
    RoundProcessor::new(&config.runtime, first_round)
}
