//! Root/account records and the block-level shapes the kernel consumes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, Address, Amount, Input, RootId, Slot, TxHash, TxId};
use super::tx_log::TxLogEntry;

/// Assurance level a root was created with (§3).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssuranceLevel {
	Normal,
	Strict,
}

impl Default for AssuranceLevel {
	fn default() -> Self {
		AssuranceLevel::Normal
	}
}

/// An unspent (or pending) output: a destination address and an amount.
/// Invariant: `amount` is always positive; callers must not construct a
/// zero-value `Output`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Output {
	pub address: Address,
	pub amount: Amount,
}

impl Output {
	pub fn new(address: Address, amount: Amount) -> Self {
		debug_assert!(amount > 0, "output amount must be positive");
		Output { address, amount }
	}
}

/// A locally-submitted transaction body: the inputs it spends and the
/// outputs it creates. Kept deliberately thin; the kernel only needs to know
/// what a transaction consumes and produces, not how it is witnessed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxBody {
	pub tx_id: TxId,
	pub inputs: Vec<Input>,
	/// Outputs of this transaction that are owned by *this* account, keyed
	/// by output index within the (not-yet-known) confirmed transaction hash.
	/// Before confirmation the transaction hash isn't known, so pending
	/// outputs are addressed purely by index.
	pub outputs: Vec<Output>,
}

/// The root of one HD wallet tree (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Root {
	pub root_id: RootId,
	pub name: String,
	pub assurance_level: AssuranceLevel,
	pub has_spending_password: bool,
	pub created_at: DateTime<Utc>,
}

impl Root {
	pub fn new(root_id: RootId, name: String, assurance_level: AssuranceLevel, has_spending_password: bool) -> Self {
		Root {
			root_id,
			name,
			assurance_level,
			has_spending_password,
			created_at: Utc::now(),
		}
	}
}

/// Per-account UTxO / pending map: `Input -> Output`.
pub type Utxo = BTreeMap<Input, Output>;

/// Account state (§3). Invariants:
/// - `utxo` keys are unique (guaranteed by the map) and amounts positive.
/// - every input of every entry in `pending` is present in `utxo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
	pub account_id: AccountId,
	pub utxo: Utxo,
	pub pending: BTreeMap<TxId, TxBody>,
	pub history: Vec<TxLogEntry>,
	pub meta: Option<BlockMeta>,
}

impl Account {
	pub fn new(account_id: AccountId) -> Self {
		Account {
			account_id,
			utxo: BTreeMap::new(),
			pending: BTreeMap::new(),
			history: Vec::new(),
			meta: None,
		}
	}

	pub fn total_balance(&self) -> Amount {
		self.utxo.values().map(|o| o.amount).sum()
	}

	/// Every input referenced by `pending` that is *not* currently in `utxo`.
	/// Used after `apply_block` to find pending transactions invalidated by
	/// the new confirmed state (§4.2 invariant).
	pub fn dangling_pending_inputs(&self) -> Vec<TxId> {
		self.pending
			.iter()
			.filter(|(_, tx)| tx.inputs.iter().any(|i| !self.utxo.contains_key(i)))
			.map(|(id, _)| id.clone())
			.collect()
	}
}

/// Per-block metadata (§3). Deliberately minimal today; the schema leaves
/// room for richer history without a breaking change (§9 open question).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMeta {
	pub slot: Slot,
	pub timestamp: Option<DateTime<Utc>>,
}

/// A block whose every input has been resolved to the output it consumes
/// (§3). `resolved_inputs` maps each input to the address that owned the
/// output it spends, so the prefilter does not need a second pass over the
/// ledger to find out who is being debited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedTx {
	pub tx_hash: TxHash,
	pub resolved_inputs: Vec<(Input, Address)>,
	pub outputs: Vec<(u32, Address, Amount)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolvedBlock {
	pub meta: BlockMeta,
	pub transactions: Vec<ResolvedTx>,
}

/// The projection of a `ResolvedBlock` onto a single account (§3).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefilteredBlock {
	pub spent_inputs: Vec<Input>,
	pub new_outputs: Vec<(Input, Output)>,
}

impl PrefilteredBlock {
	pub fn is_empty(&self) -> bool {
		self.spent_inputs.is_empty() && self.new_outputs.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn account_balance_sums_utxo() {
		let mut acc = Account::new(AccountId::new(RootId("r".into()), 0));
		acc.utxo.insert(
			Input::new(TxHash("h".into()), 0),
			Output::new(Address("a".into()), 100),
		);
		acc.utxo.insert(
			Input::new(TxHash("h".into()), 1),
			Output::new(Address("b".into()), 50),
		);
		assert_eq!(acc.total_balance(), 150);
	}

	#[test]
	fn dangling_pending_inputs_detects_missing_utxo() {
		let mut acc = Account::new(AccountId::new(RootId("r".into()), 0));
		let input = Input::new(TxHash("h".into()), 0);
		acc.utxo.insert(input.clone(), Output::new(Address("a".into()), 100));
		let tx = TxBody {
			tx_id: TxId::new(),
			inputs: vec![input.clone()],
			outputs: vec![],
		};
		acc.pending.insert(tx.tx_id.clone(), tx);
		assert!(acc.dangling_pending_inputs().is_empty());

		acc.utxo.remove(&input);
		assert_eq!(acc.dangling_pending_inputs().len(), 1);
	}
}
