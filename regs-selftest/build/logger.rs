use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Prints log messages as `cargo:warning` lines so that they show up in the build output
pub struct CargoLogger;

static LOGGER: CargoLogger = CargoLogger;

pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(max_level))
}

impl log::Log for CargoLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("cargo:warning=[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}
