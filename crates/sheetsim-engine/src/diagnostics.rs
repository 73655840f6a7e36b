//! `log`-backed diagnostics sink.

use std::fmt;

use sheetsim_core::{DiagnosticsSink, Level};

/// Log target used for every engine message.
pub const LOG_TARGET: &str = "sheetsim";

/// Forwards engine diagnostics to the [`log`] facade.
///
/// The application chooses the logger implementation; with none
/// installed, messages are discarded.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn record(&self, level: Level, message: fmt::Arguments<'_>) {
        match level {
            Level::Debug => log::debug!(target: LOG_TARGET, "{message}"),
            Level::Info => log::info!(target: LOG_TARGET, "{message}"),
            Level::Warn => log::warn!(target: LOG_TARGET, "{message}"),
            Level::Error => log::error!(target: LOG_TARGET, "{message}"),
        }
    }
}
