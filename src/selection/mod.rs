//! Input-selection evaluation harness (§4.6): a secondary, independent
//! algorithmic study living in the same crate. Its only contract with the
//! core is [`InputSelectionPolicy`] — everything else here (the simulator,
//! the policies) is self-contained, has no persistence, and is not
//! concurrent.

mod evaluator;
mod policies;

pub use self::evaluator::{CommitPolicy, Event, Simulator};
pub use self::policies::{ExactSingleMatchOnly, LargestFirst, RandomSelection};

use crate::error::PolicyError;
use crate::model::{Address, Amount, Output, TxBody, Utxo};

/// Diagnostics recorded alongside every selection (§4.6): "chosen input
/// count, change/payment ratio, and similar".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionStats {
	pub inputs_chosen: usize,
	pub payment_amount: Amount,
	pub change_amount: Amount,
}

impl SelectionStats {
	/// 0.0 when there is no payment to compare against, rather than NaN or a
	/// divide-by-zero panic.
	pub fn change_to_payment_ratio(&self) -> f64 {
		if self.payment_amount == 0 {
			0.0
		} else {
			self.change_amount as f64 / self.payment_amount as f64
		}
	}
}

/// `policy(utxo, outputs) -> Result<(tx, stats), policy_error>` (§4.6).
/// Pure: a policy never mutates `utxo`; the caller (the simulator, or the
/// `ActiveKernel` caller that built `outputs`) is responsible for turning
/// the returned `TxBody` into a submitted pending transaction.
pub trait InputSelectionPolicy: Send + Sync {
	fn select(
		&self,
		utxo: &Utxo,
		outputs: &[Output],
		change_address: &Address,
	) -> Result<(TxBody, SelectionStats), PolicyError>;
}
