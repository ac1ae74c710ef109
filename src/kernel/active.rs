//! Active Kernel (§4.5): Passive Kernel + diffusion + submission state, plus
//! the background ticker and its `bracket`-style lifecycle guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::clock::Clock;
use crate::diffusion::Diffusion;
use crate::error::NewPendingError;
use crate::kernel::passive::PassiveKernel;
use crate::model::{AccountId, TxBody};
use crate::submission::{ResubmitPolicy, SubmissionLayer};

pub struct ActiveKernel<C: Clock> {
	passive: Arc<PassiveKernel>,
	diffusion: Arc<dyn Diffusion>,
	submission: SubmissionLayer<C>,
}

impl<C: Clock> ActiveKernel<C> {
	pub fn new(passive: Arc<PassiveKernel>, diffusion: Arc<dyn Diffusion>, clock: C, policy: ResubmitPolicy) -> Self {
		ActiveKernel {
			passive,
			diffusion,
			submission: SubmissionLayer::new(clock, policy),
		}
	}

	/// Builds the resubmission policy from `passive.config().resubmit_policy`
	/// (§10 "Configuration") instead of taking one explicitly — the way
	/// production code should construct an `ActiveKernel`; `new` stays
	/// available for callers (tests, mainly) that need a policy other than
	/// the one the kernel was configured with.
	pub fn from_passive_config(passive: Arc<PassiveKernel>, diffusion: Arc<dyn Diffusion>, clock: C) -> Self {
		let policy = ResubmitPolicy::from(&passive.config().resubmit_policy);
		Self::new(passive, diffusion, clock, policy)
	}

	pub fn passive(&self) -> &Arc<PassiveKernel> {
		&self.passive
	}

	/// §4.5: commits to the store, then registers with the submission layer
	/// on success. The two steps are not atomic with respect to a crash; on
	/// recovery the store is authoritative and [`Self::seed_pending`] rebuilds
	/// the submission layer from each account's live `pending` set.
	pub fn new_pending(&self, account_id: AccountId, tx: TxBody) -> Result<(), NewPendingError> {
		self.passive.store().new_pending(account_id.clone(), tx.clone())?;
		self.submission.add_pending(account_id, vec![tx]);
		Ok(())
	}

	/// Registers `txs` with the submission layer directly, without going
	/// through `store().new_pending`'s "already pending" validation (§4.5
	/// "crash recovery"). For re-seeding a freshly constructed
	/// `ActiveKernel`'s queue from `passive.account_pending(account_id)` after
	/// a restart, where the store already holds these as pending and would
	/// otherwise reject them as a duplicate submission.
	pub fn seed_pending(&self, account_id: AccountId, txs: impl IntoIterator<Item = TxBody>) {
		self.submission.add_pending(account_id, txs);
	}

	/// One iteration of the ticker task (§4.5): drive `submission.tick`,
	/// hand `cancelled` to the store, then transmit `to_send` via diffusion
	/// in order. `cancel_pending` happens-before any send from the same tick
	/// (§5 ordering guarantee).
	pub fn tick_once(&self) {
		let result = self.submission.tick();

		if !result.cancelled.is_empty() {
			let by_account = result
				.cancelled
				.into_iter()
				.map(|(account_id, tx_ids)| (account_id, tx_ids.into_iter().collect()))
				.collect();
			self.passive.store().cancel_pending(by_account);
		}

		for tx in &result.to_send {
			if let Err(e) = self.diffusion.send_tx(tx) {
				self.passive
					.logger()
					.warning(&format!("resubmission send failed, will retry later: {}", e));
			}
		}
	}
}

/// Handle returned by [`bracket_active_wallet`]. Dropping it — on any exit
/// path, including an unwinding panic — stops the ticker thread and joins
/// it, so the ticker is guaranteed to be gone before the guard's owner is
/// torn down (§4.5, §5 "resource discipline").
pub struct TickerGuard {
	stop: Arc<AtomicBool>,
	handle: Option<thread::JoinHandle<()>>,
}

impl Drop for TickerGuard {
	fn drop(&mut self) {
		self.stop.store(true, Ordering::SeqCst);
		if let Some(handle) = self.handle.take() {
			let _ = handle.join();
		}
	}
}

/// Spawns the ticker task for `kernel`, calling `tick_once` every
/// `tick_interval` until the returned guard is dropped.
pub fn bracket_active_wallet<C: Clock + Send + Sync + 'static>(
	kernel: Arc<ActiveKernel<C>>,
	tick_interval: Duration,
) -> TickerGuard {
	let stop = Arc::new(AtomicBool::new(false));
	let stop_in_thread = stop.clone();

	let handle = thread::spawn(move || {
		while !stop_in_thread.load(Ordering::SeqCst) {
			kernel.tick_once();
			thread::sleep(tick_interval);
		}
	});

	TickerGuard {
		stop,
		handle: Some(handle),
	}
}
