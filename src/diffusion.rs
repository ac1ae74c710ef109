//! Diffusion interface (§6, consumed): fire-and-forget network send. The
//! submission layer treats any error as "try again later" (§7) and never
//! inspects the reason.

use parking_lot::Mutex;

use crate::error::SendError;
use crate::model::TxBody;

pub trait Diffusion: Send + Sync {
	fn send_tx(&self, tx: &TxBody) -> Result<(), SendError>;
}

/// Records every transaction handed to it instead of touching a real
/// network. The ticker tests (§8 S4/S5) and the active-kernel tests drive
/// this directly.
#[derive(Default)]
pub struct InMemoryDiffusion {
	sent: Mutex<Vec<TxBody>>,
	fail_next: Mutex<usize>,
}

impl InMemoryDiffusion {
	pub fn new() -> Self {
		Self::default()
	}

	/// The next `n` calls to `send_tx` return `Err` instead of recording.
	pub fn fail_next_n_sends(&self, n: usize) {
		*self.fail_next.lock() = n;
	}

	pub fn sent(&self) -> Vec<TxBody> {
		self.sent.lock().clone()
	}
}

impl Diffusion for InMemoryDiffusion {
	fn send_tx(&self, tx: &TxBody) -> Result<(), SendError> {
		let mut fail_next = self.fail_next.lock();
		if *fail_next > 0 {
			*fail_next -= 1;
			return Err(SendError(format!("simulated failure sending {}", tx.tx_id)));
		}
		self.sent.lock().push(tx.clone());
		Ok(())
	}
}
