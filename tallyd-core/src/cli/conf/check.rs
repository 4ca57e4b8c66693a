use crate::conf::{ConfigError, load_config};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub fn check(path: PathBuf, plain: bool) -> anyhow::Result<()> {
    match load_config(&path) {
        Ok(cfg) => {
            let runtime = &cfg.runtime;
            println!("✔ Config loaded successfully");
            println!("✔ {} streams", runtime.streams.len());
            println!("✔ {} valid request patterns", runtime.rules.valid.len());
            println!("✔ {} skip patterns", runtime.rules.skip.len());
            println!("✔ {} aggregation rules", runtime.rules.aggregation.len());
            println!("✔ {} extraction rules", runtime.rules.extraction.len());
            println!("✔ round every {}s", runtime.interval.as_secs());
            Ok(())
        }
        Err(err) => {
            print_config_error(&err, plain);
            std::process::exit(1);
        }
    }
}

fn print_config_error(err: &ConfigError, plain: bool) {
    if plain {
        eprintln!("{err}");
    } else {
        eprintln!("{}: {err}", "error".red().bold());
    }

    for issue in err.issues() {
        if plain {
            eprintln!("  {issue}");
        } else {
            eprintln!("  {}: {}", issue.field.yellow(), issue.message);
        }
    }

    if let Some(hint) = config_error_hint(err) {
        eprintln!();
        eprintln!("{hint}");
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::Validation { issues } if issues.iter().any(|i| i.field == "streams") => Some(
            "At least one stream must be configured.\n\
             \n\
             Example:\n\
             \n\
             [[streams]]\n\
             input  = \"/var/log/apache/access.log\"\n\
             output = \"/var/lib/tallyd/apache.dump\"",
        ),

        ConfigError::Validation { issues } if issues.iter().any(|i| i.field == "valid_requests") => {
            Some(
                "Requests are only counted when a valid request pattern matches.\n\
                 \n\
                 Example:\n\
                 \n\
                 valid_requests = ['^/data/(?P<group>[\\w.]+)/(?P<method>[\\w.]+)']",
            )
        }

        _ => None,
    }
}
