//! Submission layer (§4.4): the resubmission state machine for locally
//! issued pending transactions.
//!
//! ```text
//!    added ──► scheduled ──tick(due)──► dispatched ──► scheduled (attempts++)
//!                                               └──(attempts > cap)──► cancelled
//!    scheduled ──remove──► removed
//! ```

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::clock::{Clock, MonoMicros};
use crate::model::{AccountId, TxBody, TxId};

/// `attempts -> wait_duration`, in the clock's own units. Default: base 1.25,
/// capped at 255 attempts (§4.4).
#[derive(Clone, Copy, Debug)]
pub struct ResubmitPolicy {
	pub backoff_base: f64,
	pub base_wait: MonoMicros,
	pub max_attempts: u32,
}

impl Default for ResubmitPolicy {
	fn default() -> Self {
		ResubmitPolicy {
			backoff_base: 1.25,
			base_wait: 1,
			max_attempts: 255,
		}
	}
}

impl ResubmitPolicy {
	/// Wait before the `attempts`-th (1-indexed) retry. Attempt *k* waits
	/// `base_wait * backoff_base^k` (§8 invariant 7).
	pub fn wait_for_attempt(&self, attempts: u32) -> MonoMicros {
		let scaled = self.base_wait as f64 * self.backoff_base.powi(attempts as i32);
		scaled.round() as MonoMicros
	}

	pub fn is_exhausted(&self, attempts: u32) -> bool {
		attempts > self.max_attempts
	}
}

#[derive(Clone, Debug)]
struct QueueEntry {
	account_id: AccountId,
	tx: TxBody,
	attempts: u32,
	next_due: MonoMicros,
}

/// Per-`ActiveKernel` queue of pending transactions awaiting (re)transmission.
pub struct SubmissionLayer<C: Clock> {
	clock: C,
	policy: ResubmitPolicy,
	queue: Mutex<HashMap<TxId, QueueEntry>>,
}

/// Outcome of one `tick` (§4.4).
#[derive(Debug, Default)]
pub struct TickResult {
	pub cancelled: HashMap<AccountId, Vec<TxId>>,
	pub to_send: Vec<TxBody>,
}

impl<C: Clock> SubmissionLayer<C> {
	pub fn new(clock: C, policy: ResubmitPolicy) -> Self {
		SubmissionLayer {
			clock,
			policy,
			queue: Mutex::new(HashMap::new()),
		}
	}

	pub fn policy(&self) -> &ResubmitPolicy {
		&self.policy
	}

	/// Enqueues each transaction with `attempts = 0`, due immediately.
	pub fn add_pending(&self, account_id: AccountId, txs: impl IntoIterator<Item = TxBody>) {
		let now = self.clock.now();
		let mut queue = self.queue.lock();
		for tx in txs {
			queue.insert(
				tx.tx_id.clone(),
				QueueEntry {
					account_id: account_id.clone(),
					tx,
					attempts: 0,
					next_due: now,
				},
			);
		}
	}

	/// Dequeues `tx_id`, e.g. because the kernel observed confirmation.
	/// A no-op if `tx_id` is not queued.
	pub fn remove(&self, tx_id: &TxId) {
		self.queue.lock().remove(tx_id);
	}

	pub fn len(&self) -> usize {
		self.queue.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.lock().is_empty()
	}

	/// Advances the clock's view and returns the entries that are now
	/// cancelled (attempts exhausted) and the entries due for dispatch,
	/// in `next_due` order (§4.4 fairness guarantee). An entry is counted in
	/// exactly one of the two returned collections, never both (§8 invariant
	/// 6).
	pub fn tick(&self) -> TickResult {
		let now = self.clock.now();
		let mut queue = self.queue.lock();
		let mut result = TickResult::default();

		let mut due_ids: Vec<TxId> = queue
			.iter()
			.filter(|(_, entry)| entry.next_due <= now)
			.map(|(id, _)| id.clone())
			.collect();
		due_ids.sort_by_key(|id| queue[id].next_due);

		for tx_id in due_ids {
			let mut entry = queue.remove(&tx_id).expect("id drawn from queue keys");
			entry.attempts += 1;
			if self.policy.is_exhausted(entry.attempts) {
				result
					.cancelled
					.entry(entry.account_id.clone())
					.or_default()
					.push(tx_id);
				continue;
			}
			entry.next_due = now + self.policy.wait_for_attempt(entry.attempts);
			result.to_send.push(entry.tx.clone());
			queue.insert(tx_id, entry);
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::model::RootId;

	fn account() -> AccountId {
		AccountId::new(RootId("r1".into()), 0)
	}

	fn tx() -> TxBody {
		TxBody {
			tx_id: TxId::new(),
			inputs: vec![],
			outputs: vec![],
		}
	}

	#[test]
	fn scenario_s4_backoff_schedule() {
		let clock = ManualClock::new();
		let policy = ResubmitPolicy {
			backoff_base: 1.25,
			base_wait: 1_000_000,
			max_attempts: 255,
		};
		let layer = SubmissionLayer::new(clock, policy);
		let tx = tx();
		layer.add_pending(account(), vec![tx.clone()]);

		layer.clock.advance_micros(1_000_000);
		let first = layer.tick();
		assert_eq!(first.to_send.len(), 1);
		assert!(first.cancelled.is_empty());

		layer.clock.advance_micros(500_000);
		let second = layer.tick();
		assert!(second.to_send.is_empty(), "not yet due at t=1.5s");

		layer.clock.advance_micros(750_000);
		let third = layer.tick();
		assert_eq!(third.to_send.len(), 1, "due again at t=2.25s");
	}

	#[test]
	fn scenario_s5_gives_up_after_cap() {
		let clock = ManualClock::new();
		let policy = ResubmitPolicy {
			backoff_base: 1.0,
			base_wait: 1,
			max_attempts: 3,
		};
		let layer = SubmissionLayer::new(clock, policy);
		let tx = tx();
		layer.add_pending(account(), vec![tx.clone()]);

		for _ in 0..3 {
			layer.clock.advance_micros(10);
			let result = layer.tick();
			assert_eq!(result.to_send.len(), 1);
			assert!(result.cancelled.is_empty());
		}

		layer.clock.advance_micros(10);
		let final_tick = layer.tick();
		assert!(final_tick.to_send.is_empty());
		assert_eq!(final_tick.cancelled.get(&account()).unwrap(), &vec![tx.tx_id.clone()]);

		layer.clock.advance_micros(10);
		let after = layer.tick();
		assert!(after.to_send.is_empty());
		assert!(after.cancelled.is_empty());
		assert!(layer.is_empty());
	}

	#[test]
	fn remove_dequeues_without_touching_tick_output() {
		let clock = ManualClock::new();
		let layer = SubmissionLayer::new(clock, ResubmitPolicy::default());
		let tx = tx();
		layer.add_pending(account(), vec![tx.clone()]);
		layer.remove(&tx.tx_id);
		assert!(layer.is_empty());
		let result = layer.tick();
		assert!(result.to_send.is_empty());
		assert!(result.cancelled.is_empty());
	}

	#[test]
	fn dispatch_is_fair_by_due_time() {
		let clock = ManualClock::new();
		let policy = ResubmitPolicy {
			backoff_base: 1.0,
			base_wait: 1,
			max_attempts: 255,
		};
		let layer = SubmissionLayer::new(clock, policy);
		let early = tx();
		let late = tx();
		layer.add_pending(account(), vec![early.clone()]);
		layer.clock.advance_micros(5);
		layer.add_pending(account(), vec![late.clone()]);
		layer.clock.advance_micros(10);

		let result = layer.tick();
		let ids: Vec<_> = result.to_send.iter().map(|t| t.tx_id.clone()).collect();
		assert_eq!(ids, vec![early.tx_id, late.tx_id]);
	}
}
