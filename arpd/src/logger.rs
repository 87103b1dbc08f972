//! A minimal stderr logger for the `arpd` binary.
//!
//! Records look like `[    1.2345678] INFO afpacket: message`. Only records whose target
//! belongs to one of the `arpd` crates are written.

use std::fmt;
use std::io::Write;
use std::time::Instant;

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;

struct Logger {
    start_time: Instant,
}

struct PrettyModulePath<'a>(Option<&'a str>);

static LOGGER: OnceCell<Logger> = OnceCell::new();

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with(env!("CARGO_PKG_NAME"))
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let time = self.start_time.elapsed().as_secs_f64();
            let level = level_str(record.level());
            let module = PrettyModulePath(record.module_path());
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "[{time:>13.7}] {level} {module}{}", record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_str(level: Level) -> &'static str {
    match level {
        Level::Error => "ERRO",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBG",
        Level::Trace => "TRCE",
    }
}

impl fmt::Display for PrettyModulePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.and_then(|path| path.split("::").last()) {
            Some(last) if self.0 != Some(env!("CARGO_PKG_NAME")) => write!(f, "{last}: "),
            _ => Ok(()),
        }
    }
}

/// Install the logger with the given maximum level. Fails if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| Logger {
        start_time: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
