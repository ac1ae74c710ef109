//! Logger interface (§6, consumed). Kept as a small trait so the kernels
//! never hard-code a logging backend; production code forwards to the `log`
//! crate's global facade the same way the rest of this codebase's business
//! logic calls `info!`/`warn!`/`error!` after a binary has initialized
//! `env_logger` once at startup.

use parking_lot::Mutex;

/// Severity levels the kernel can log at (§6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	Debug,
	Info,
	Warning,
	Error,
}

/// `log(severity, message) -> ()`, synchronous (§6).
pub trait Logger: Send + Sync {
	fn log(&self, severity: Severity, message: &str);

	fn debug(&self, message: &str) {
		self.log(Severity::Debug, message);
	}
	fn info(&self, message: &str) {
		self.log(Severity::Info, message);
	}
	fn warning(&self, message: &str) {
		self.log(Severity::Warning, message);
	}
	fn error(&self, message: &str) {
		self.log(Severity::Error, message);
	}
}

/// Forwards to the `log` crate's global macros. This is what
/// `PassiveKernel`/`ActiveKernel` use unless a caller injects something else.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdLogger;

impl Logger for StdLogger {
	fn log(&self, severity: Severity, message: &str) {
		match severity {
			Severity::Debug => log::debug!("{}", message),
			Severity::Info => log::info!("{}", message),
			Severity::Warning => log::warn!("{}", message),
			Severity::Error => log::error!("{}", message),
		}
	}
}

/// Discards everything. Useful when a test doesn't care about log output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
	fn log(&self, _severity: Severity, _message: &str) {}
}

/// Records every call for assertions in tests, instead of relying on
/// capturing process stdout.
#[derive(Default)]
pub struct RecordingLogger {
	entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingLogger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> Vec<(Severity, String)> {
		self.entries.lock().clone()
	}
}

impl Logger for RecordingLogger {
	fn log(&self, severity: Severity, message: &str) {
		self.entries.lock().push((severity, message.to_string()));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recording_logger_captures_messages_in_order() {
		let logger = RecordingLogger::new();
		logger.info("first");
		logger.warning("second");
		let entries = logger.entries();
		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0], (Severity::Info, "first".to_string()));
		assert_eq!(entries[1], (Severity::Warning, "second".to_string()));
	}
}
