// pgbackup/src/utils/journal.rs
use log::Level;

/// Sink for the line-oriented diagnostics every workflow step emits.
///
/// Components receive a `&dyn Journal` instead of calling the `log` macros
/// directly so a run can be observed in isolation.
pub trait Journal: Send + Sync {
    fn record(&self, level: Level, component: &str, message: &str);

    fn info(&self, component: &str, message: &str) {
        self.record(Level::Info, component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        self.record(Level::Warn, component, message);
    }

    fn error(&self, component: &str, message: &str) {
        self.record(Level::Error, component, message);
    }
}

/// Forwards to the process-wide `log` backend, using the component as target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogJournal;

impl Journal for LogJournal {
    fn record(&self, level: Level, component: &str, message: &str) {
        log::log!(target: component, level, "{}", message);
    }
}
