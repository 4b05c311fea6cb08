use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::{Mutex, const_mutex};
use std::sync::Once;

static LOGGER: Capture = Capture;
static ERRORS: Mutex<Vec<String>> = const_mutex(Vec::new());
static INIT: Once = Once::new();

// Keeps error-level records so tests can check what reached the log.
struct Capture;

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Error
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            ERRORS.lock().push(record.args().to_string());
        }
    }

    fn flush(&self) {
    }
}

pub fn capture_logs() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).expect("logger already installed");
        log::set_max_level(LevelFilter::Error);
    });
}

pub fn logged_error_containing(needle: &str) -> bool {
    ERRORS.lock().iter().any(|msg| msg.contains(needle))
}
