//! # Diagnostics Sink
//!
//! The resolution engine reports through a `log::Log` sink it owns, instead
//! of the process-wide logger installed behind the `log` macros. Callers
//! hand the sink in with `ComponentManager::with_logger`; usable components
//! share their engine's sink so that cleanup failures end up next to the
//! fetch messages that produced them.
//!
//! [`FacadeLogger`] is the default sink. It forwards every record to
//! whatever logger the process installed (`env_logger` in the binary), so a
//! library user that never injects a sink still gets ordinary `log` output.

use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

/// Target of every record emitted by the engine
pub const LOG_TARGET: &str = "component_resolver";

/// Shared handle to a diagnostics sink
pub type LogSink = Arc<dyn Log>;

/// Sink forwarding to the global `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeLogger;

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// The sink used when none is injected
pub fn default_sink() -> LogSink {
    Arc::new(FacadeLogger)
}

/// Sends one record to `sink` if it accepts the level.
pub fn emit_record(sink: &dyn Log, level: Level, args: fmt::Arguments<'_>) {
    let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
    if !sink.enabled(&metadata) {
        return;
    }
    sink.log(
        &Record::builder()
            .metadata(metadata)
            .args(args)
            .module_path_static(Some(module_path!()))
            .build(),
    );
}

/// `log`-style macro writing to an explicit sink:
/// `emit!(sink, Level::Info, "fetched {}", id)`.
macro_rules! emit {
    ($sink:expr, $level:expr, $($arg:tt)+) => {
        $crate::diagnostics::emit_record(&*$sink, $level, format_args!($($arg)+))
    };
}

pub(crate) use emit;


#[cfg(test)]
mod tests {
    use super::testing::CapturingLogger;
    use super::*;

    #[test]
    fn test_emit_reaches_injected_sink() {
        let sink = Arc::new(CapturingLogger::default());
        emit!(sink, Level::Warn, "cleanup of {} failed", "core");
        assert_eq!(
            sink.records(),
            vec![(Level::Warn, "cleanup of core failed".to_string())]
        );
    }

    #[test]
    fn test_facade_logger_without_global_logger() {
        // No logger is installed in unit tests: forwarding must be harmless.
        let sink = default_sink();
        emit!(sink, Level::Info, "nothing to see");
        sink.flush();
    }
}
