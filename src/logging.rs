use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;

/// Environment variable holding an env_logger filter that overrides `-v`.
pub const LOG_ENV: &str = "TASKCAL_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Plain commands can log to stderr.
    Stderr,
    /// The TUI owns the terminal; only a log file is safe.
    Tui,
}

pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbose: u8, log_file: Option<&Path>, sink: Sink) -> Result<()> {
    let mut builder = Builder::new();
    builder.format_timestamp_millis();

    match (log_file, sink) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {:?}", path))?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.filter_level(level_for(verbose));
        }
        (None, Sink::Stderr) => {
            builder.target(Target::Stderr);
            builder.filter_level(level_for(verbose));
        }
        (None, Sink::Tui) => {
            builder.filter_level(LevelFilter::Off);
        }
    }

    if sink == Sink::Stderr || log_file.is_some() {
        builder.parse_env(LOG_ENV);
    }
    builder.try_init().context("initializing logger")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }
}
