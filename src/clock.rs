//! Clock interface (§6). Injected into the submission layer so backoff
//! scheduling is deterministic in tests; production code uses the system
//! clock, the same way the rest of this codebase's injected capabilities
//! (node client, diffusion) have a real implementation and a test fake.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::BlockMeta;

/// Monotonic timestamp in microseconds since an unspecified epoch. Only
/// meaningful relative to other timestamps from the same `Clock`.
pub type MonoMicros = u64;

pub trait Clock: Send + Sync {
	fn now(&self) -> MonoMicros;

	/// The timestamp a resolved block carries, if any (§6).
	fn block_timestamp_of(&self, meta: &BlockMeta) -> Option<DateTime<Utc>> {
		meta.timestamp
	}
}

/// Wall-clock time, in microseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> MonoMicros {
		let now = Utc::now();
		now.timestamp() as u64 * 1_000_000 + now.timestamp_subsec_micros() as u64
	}
}

/// A clock a test can advance by hand. Starts at zero; `advance_micros`
/// moves it forward, never backward. Cloning shares the same underlying
/// counter — a test can hand one clone to an `ActiveKernel` (which takes
/// its clock by value) and keep another to drive it from outside.
#[derive(Clone, Default)]
pub struct ManualClock {
	micros: Arc<AtomicU64>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn at(micros: MonoMicros) -> Self {
		ManualClock {
			micros: Arc::new(AtomicU64::new(micros)),
		}
	}

	pub fn advance_micros(&self, delta: u64) {
		self.micros.fetch_add(delta, Ordering::SeqCst);
	}

	pub fn set_micros(&self, value: MonoMicros) {
		self.micros.store(value, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> MonoMicros {
		self.micros.load(Ordering::SeqCst)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_advances_monotonically() {
		let clock = ManualClock::new();
		assert_eq!(clock.now(), 0);
		clock.advance_micros(1_000_000);
		assert_eq!(clock.now(), 1_000_000);
		clock.advance_micros(500_000);
		assert_eq!(clock.now(), 1_500_000);
	}
}
