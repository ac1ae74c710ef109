//! Passive Kernel (§4.3): owns the ESK map, the store handle, and the
//! logger; drives block ingest end to end.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::KernelConfig;
use crate::error::CreateHdRootError;
use crate::keys::{Esk, EskMap};
use crate::logger::{Logger, StdLogger};
use crate::model::{
	AccountId, Address, Amount, AssuranceLevel, Input, Output, ResolvedBlock, Root, RootId, TxLogEntry, Utxo,
};
use crate::prefilter::prefilter_folded;
use crate::store::{DbView, HdWalletStore};

/// A single entry of an HD wallet's genesis UTxO, passed to
/// `create_wallet_hd_random` before any account ids are known (§4.3).
#[derive(Clone, Debug)]
pub struct GenesisUtxoEntry {
	pub input: Input,
	pub address: Address,
	pub amount: Amount,
}

pub struct PassiveKernel {
	esk_map: EskMap,
	store: HdWalletStore,
	logger: Arc<dyn Logger>,
	config: KernelConfig,
}

impl Default for PassiveKernel {
	fn default() -> Self {
		PassiveKernel::new(KernelConfig::default(), Arc::new(StdLogger))
	}
}

impl PassiveKernel {
	pub fn new(config: KernelConfig, logger: Arc<dyn Logger>) -> Self {
		PassiveKernel {
			esk_map: EskMap::new(),
			store: HdWalletStore::new(),
			logger,
			config,
		}
	}

	pub fn store(&self) -> &HdWalletStore {
		&self.store
	}

	pub fn logger(&self) -> &Arc<dyn Logger> {
		&self.logger
	}

	pub fn config(&self) -> &KernelConfig {
		&self.config
	}

	/// §4.3: derives `RootId` from `pub_key_hash`, prefilters
	/// `genesis_utxo` under `esk` to discover which accounts exist and what
	/// each owns, creates the root, and — only on success — registers the
	/// ESK under the new `WalletId`.
	pub fn create_wallet_hd_random(
		&self,
		name: String,
		has_spending_password: bool,
		assurance: Option<AssuranceLevel>,
		pub_key_hash: &[u8],
		esk: Esk,
		genesis_utxo: Vec<GenesisUtxoEntry>,
	) -> Result<Vec<AccountId>, CreateHdRootError> {
		let root_id = RootId::from_pub_key_hash(pub_key_hash);
		let assurance = assurance.unwrap_or(self.config.default_assurance_level);

		let mut utxo_by_account: HashMap<AccountId, Utxo> = HashMap::new();
		for entry in genesis_utxo {
			match esk.owning_account_index(&entry.address) {
				Some(index) => {
					let account_id = AccountId::new(root_id.clone(), index);
					utxo_by_account
						.entry(account_id)
						.or_default()
						.insert(entry.input, Output::new(entry.address, entry.amount));
				}
				None => {
					self.logger
						.warning(&format!("skipping genesis utxo entry not owned by any account: {}", entry.input));
				}
			}
		}

		let mut account_ids: Vec<AccountId> = utxo_by_account.keys().cloned().collect();
		account_ids.sort();

		let root = Root::new(root_id.clone(), name, assurance, has_spending_password);
		self.store.create_hd_wallet(root, utxo_by_account)?;
		self.esk_map.insert(root_id, esk);
		Ok(account_ids)
	}

	/// §4.3: prefilters `block` across every registered ESK, then commits
	/// the result in one atomic store operation.
	pub fn apply_block(&self, block: ResolvedBlock) {
		let esks = self.esk_map.snapshot();
		let per_account = prefilter_folded(&block, &esks);
		let meta = block.meta.clone();
		self.store.apply_block(per_account, meta);
	}

	/// §4.3: sequentially applies each block with one atomic commit per
	/// block. A crash partway through leaves the store consistent at the
	/// last committed block.
	pub fn apply_blocks(&self, blocks: impl IntoIterator<Item = ResolvedBlock>) {
		for block in blocks {
			self.apply_block(block);
		}
	}

	pub fn account_utxo(&self, account_id: &AccountId) -> Result<Utxo, crate::error::QueryError> {
		self.store.snapshot().account_utxo(account_id)
	}

	pub fn account_total_balance(&self, account_id: &AccountId) -> Result<Amount, crate::error::QueryError> {
		self.store.snapshot().account_total_balance(account_id)
	}

	pub fn account_history(&self, account_id: &AccountId) -> Result<Vec<TxLogEntry>, crate::error::QueryError> {
		self.store.snapshot().account_history(account_id)
	}

	pub fn account_pending(&self, account_id: &AccountId) -> Result<Vec<crate::model::TxBody>, crate::error::QueryError> {
		self.store.snapshot().account_pending(account_id)
	}

	pub fn root_info(&self, root_id: &RootId) -> Result<Root, crate::error::QueryError> {
		self.store.snapshot().root_info(root_id)
	}

	pub fn account_ids_for_root(&self, root_id: &RootId) -> Result<Vec<AccountId>, crate::error::QueryError> {
		self.store.snapshot().account_ids_for_root(root_id)
	}

	pub fn snapshot(&self) -> Arc<DbView> {
		self.store.snapshot()
	}
}
