//! HD Wallet Store (§4.2): the transactional, in-memory root→account tree.
//!
//! A single writer lock serializes every mutation. Each mutation builds a
//! new [`DbView`] from the previous one — cheaply, because every account is
//! held behind an `Arc` so cloning the top-level maps does not copy UTxO or
//! pending contents — and the new view is published by swapping an `Arc`
//! under a short-held `RwLock`. A reader only ever holds that lock for the
//! instant it takes to clone the `Arc`; every query after that runs against
//! an immutable snapshot and is never blocked by a concurrent writer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{CreateHdRootError, NewPendingError, QueryError};
use crate::model::{
	Account, AccountId, Amount, BlockMeta, PrefilteredBlock, Root, RootId, TxBody, TxId, TxLogEntry,
	TxLogEntryKind, Utxo,
};

/// A read-only, point-in-time view of the store (§4.2 "snapshot").
#[derive(Clone, Default)]
pub struct DbView {
	roots: HashMap<RootId, Arc<Root>>,
	accounts: HashMap<AccountId, Arc<Account>>,
}

impl DbView {
	pub fn account_utxo(&self, account_id: &AccountId) -> Result<Utxo, QueryError> {
		self.account(account_id).map(|a| a.utxo.clone())
	}

	/// Confirmed balance only: pending outputs are excluded, and so are
	/// pending spends (§4.2 "available balance" semantics) — which is
	/// automatic here since `pending` never mutates `utxo`.
	pub fn account_total_balance(&self, account_id: &AccountId) -> Result<Amount, QueryError> {
		self.account(account_id).map(|a| a.total_balance())
	}

	/// Newest first (§4.2).
	pub fn account_history(&self, account_id: &AccountId) -> Result<Vec<TxLogEntry>, QueryError> {
		self.account(account_id).map(|a| {
			let mut history = a.history.clone();
			history.reverse();
			history
		})
	}

	/// This account's locally-submitted, not-yet-confirmed transactions
	/// (§4.5 "crash recovery") — what an embedder re-seeds a fresh
	/// `SubmissionLayer` from after a restart.
	pub fn account_pending(&self, account_id: &AccountId) -> Result<Vec<TxBody>, QueryError> {
		self.account(account_id).map(|a| a.pending.values().cloned().collect())
	}

	pub fn root_info(&self, root_id: &RootId) -> Result<Root, QueryError> {
		self.roots
			.get(root_id)
			.map(|r| (**r).clone())
			.ok_or_else(|| QueryError::UnknownRoot(root_id.clone()))
	}

	pub fn account_ids_for_root(&self, root_id: &RootId) -> Result<Vec<AccountId>, QueryError> {
		if !self.roots.contains_key(root_id) {
			return Err(QueryError::UnknownRoot(root_id.clone()));
		}
		let mut ids: Vec<AccountId> = self
			.accounts
			.keys()
			.filter(|id| &id.root_id == root_id)
			.cloned()
			.collect();
		ids.sort();
		Ok(ids)
	}

	fn account(&self, account_id: &AccountId) -> Result<Arc<Account>, QueryError> {
		self.accounts
			.get(account_id)
			.cloned()
			.ok_or_else(|| QueryError::UnknownAccount(account_id.clone()))
	}
}

pub struct HdWalletStore {
	current: RwLock<Arc<DbView>>,
	writer_lock: Mutex<()>,
}

impl Default for HdWalletStore {
	fn default() -> Self {
		HdWalletStore {
			current: RwLock::new(Arc::new(DbView::default())),
			writer_lock: Mutex::new(()),
		}
	}
}

impl HdWalletStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn snapshot(&self) -> Arc<DbView> {
		self.current.read().clone()
	}

	/// §4.2 operation 1. Creates `root` and any accounts appearing as keys
	/// in `utxo_by_account`.
	pub fn create_hd_wallet(
		&self,
		root: Root,
		utxo_by_account: HashMap<AccountId, Utxo>,
	) -> Result<(), CreateHdRootError> {
		let _guard = self.writer_lock.lock();
		let current = self.current.read().clone();
		if current.roots.contains_key(&root.root_id) {
			return Err(CreateHdRootError::RootAlreadyExists(root.root_id));
		}

		let mut next = (*current).clone();
		next.roots.insert(root.root_id.clone(), Arc::new(root));
		for (account_id, utxo) in utxo_by_account {
			let mut account = Account::new(account_id.clone());
			if !utxo.is_empty() {
				let amount: Amount = utxo.values().map(|o| o.amount).sum();
				account.utxo = utxo;
				let mut entry = TxLogEntry::new(0, TxLogEntryKind::Received);
				entry.amount_credited = amount;
				entry.confirm_now();
				account.history.push(entry);
			}
			next.accounts.insert(account_id, Arc::new(account));
		}
		*self.current.write() = Arc::new(next);
		Ok(())
	}

	/// §4.2 operation 2. Atomic: either every per-account mutation below
	/// commits, or (on a poisoned lock) none do — there is no partial
	/// failure mode here since prefiltering is total (§7).
	pub fn apply_block(&self, per_account: HashMap<AccountId, PrefilteredBlock>, meta: BlockMeta) {
		let _guard = self.writer_lock.lock();
		let current = self.current.read().clone();
		let mut next = (*current).clone();

		for (account_id, prefiltered) in per_account {
			let mut account = next
				.accounts
				.get(&account_id)
				.map(|a| (**a).clone())
				.unwrap_or_else(|| Account::new(account_id.clone()));

			for input in &prefiltered.spent_inputs {
				if let Some(output) = account.utxo.remove(input) {
					let mut entry = TxLogEntry::new(account.history.len() as u32, TxLogEntryKind::Sent);
					entry.amount_debited = output.amount;
					entry.confirm_now();
					account.history.push(entry);
				}
			}
			for (input, output) in &prefiltered.new_outputs {
				let previous = account.utxo.insert(input.clone(), output.clone());
				if previous.as_ref() != Some(output) {
					let mut entry = TxLogEntry::new(account.history.len() as u32, TxLogEntryKind::Received);
					entry.amount_credited = output.amount;
					entry.confirm_now();
					account.history.push(entry);
				}
			}

			// Invariant (§4.2): every pending tx's inputs must remain in
			// `utxo`. Drop any that no longer hold after this block.
			for tx_id in account.dangling_pending_inputs() {
				if account.pending.remove(&tx_id).is_some() {
					let mut entry = TxLogEntry::new(account.history.len() as u32, TxLogEntryKind::SentCancelled);
					entry.tx_id = Some(tx_id);
					entry.confirm_now();
					account.history.push(entry);
				}
			}

			account.meta = Some(meta.clone());
			next.accounts.insert(account_id, Arc::new(account));
		}

		*self.current.write() = Arc::new(next);
	}

	/// §4.2 operation 3.
	pub fn new_pending(&self, account_id: AccountId, tx: TxBody) -> Result<(), NewPendingError> {
		let _guard = self.writer_lock.lock();
		let current = self.current.read().clone();
		let mut account = current
			.accounts
			.get(&account_id)
			.map(|a| (**a).clone())
			.ok_or_else(|| NewPendingError::UnknownAccount(account_id.clone()))?;

		let unavailable: Vec<_> = tx
			.inputs
			.iter()
			.filter(|i| !account.utxo.contains_key(i) || account.pending.values().any(|p| p.inputs.contains(i)))
			.cloned()
			.collect();
		if !unavailable.is_empty() {
			return Err(NewPendingError::InputsUnavailable(unavailable));
		}

		let debited: Amount = tx
			.inputs
			.iter()
			.filter_map(|i| account.utxo.get(i))
			.map(|o| o.amount)
			.sum();
		let mut entry = TxLogEntry::new(account.history.len() as u32, TxLogEntryKind::Sent);
		entry.tx_id = Some(tx.tx_id.clone());
		entry.amount_debited = debited;
		account.history.push(entry);
		account.pending.insert(tx.tx_id.clone(), tx);

		let mut next = (*current).clone();
		next.accounts.insert(account_id, Arc::new(account));
		*self.current.write() = Arc::new(next);
		Ok(())
	}

	/// §4.2 operation 4. Idempotent: unknown account/tx ids are silently
	/// ignored.
	pub fn cancel_pending(&self, by_account: HashMap<AccountId, HashSet<TxId>>) {
		let _guard = self.writer_lock.lock();
		let current = self.current.read().clone();
		let mut next = (*current).clone();

		for (account_id, tx_ids) in by_account {
			let existing = match next.accounts.get(&account_id) {
				Some(a) => a,
				None => continue,
			};
			let mut account = (**existing).clone();
			for tx_id in tx_ids {
				if account.pending.remove(&tx_id).is_some() {
					let mut entry = TxLogEntry::new(account.history.len() as u32, TxLogEntryKind::SentCancelled);
					entry.tx_id = Some(tx_id);
					entry.confirm_now();
					account.history.push(entry);
				}
			}
			next.accounts.insert(account_id, Arc::new(account));
		}

		*self.current.write() = Arc::new(next);
	}
}
