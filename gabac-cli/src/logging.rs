use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::PROGRESS_BAR;

/// Logger writing timestamped records to stderr, or through the progress
/// bar when one is being drawn so log lines do not tear it.
struct StderrLogger;

impl StderrLogger {
    fn format_record(record: &Record) -> String {
        format!(
            "{} {:<5} {}: {}",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_record(record);
        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", line);
        } else {
            PROGRESS_BAR.println(line);
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_max_level(filter);
    log::set_logger(&LOGGER)
}
