//! Encrypted Secret Keys and the process-local map that holds them (§3, §4.3
//! "ESK map policy"). Keys never enter the `HdWalletStore`; they live only
//! here, for exactly as long as the owning `PassiveKernel` does.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{Address, WalletId};

/// Cryptographic primitives are out of scope (§4.1): this trait stands in
/// for a real BIP32-style derivation. Given an address it answers either
/// "not mine" or "mine, at this account index."
pub trait KeyDerivation: Send + Sync {
	fn owning_account_index(&self, address: &Address) -> Option<u32>;
}

/// An Encrypted Secret Key: opaque keying material plus the address-scheme
/// derivation it grants. Cheap to clone — it's a handle onto shared
/// derivation logic, not the key material itself.
#[derive(Clone)]
pub struct Esk {
	derivation: Arc<dyn KeyDerivation>,
}

impl Esk {
	pub fn new<D: KeyDerivation + 'static>(derivation: D) -> Self {
		Esk {
			derivation: Arc::new(derivation),
		}
	}

	pub fn owning_account_index(&self, address: &Address) -> Option<u32> {
		self.derivation.owning_account_index(address)
	}
}

/// Process-local map from `WalletId` to `Esk` (§4.3). Readers take a shared
/// lock; insertion is exclusive and idempotent — inserting over an existing
/// `WalletId` is a no-op, the first ESK registered for a wallet wins, since
/// replacing it silently would be a correctness hazard for anything still
/// holding an account derived from the old one.
#[derive(Default)]
pub struct EskMap {
	inner: RwLock<HashMap<WalletId, Esk>>,
}

impl EskMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if this call actually inserted the ESK (the wallet was
	/// not already present).
	pub fn insert(&self, wallet_id: WalletId, esk: Esk) -> bool {
		let mut guard = self.inner.write();
		if guard.contains_key(&wallet_id) {
			return false;
		}
		guard.insert(wallet_id, esk);
		true
	}

	pub fn get(&self, wallet_id: &WalletId) -> Option<Esk> {
		self.inner.read().get(wallet_id).cloned()
	}

	pub fn contains(&self, wallet_id: &WalletId) -> bool {
		self.inner.read().contains_key(wallet_id)
	}

	/// A snapshot of every `(WalletId, Esk)` pair, for the prefilter's
	/// full-map pass (§4.1). Cloning the map is cheap: each `Esk` is an
	/// `Arc` handle.
	pub fn snapshot(&self) -> Vec<(WalletId, Esk)> {
		self.inner
			.read()
			.iter()
			.map(|(id, esk)| (id.clone(), esk.clone()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().is_empty()
	}
}

/// A deterministic fake that owns a fixed set of addresses, each mapped to
/// an account index. Tests plug this in wherever production code would plug
/// in a real derivation (§4.1).
#[derive(Clone, Default)]
pub struct FakeKeyDerivation {
	owned: HashMap<Address, u32>,
}

impl FakeKeyDerivation {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn owning(mut self, address: Address, account_index: u32) -> Self {
		self.owned.insert(address, account_index);
		self
	}
}

impl KeyDerivation for FakeKeyDerivation {
	fn owning_account_index(&self, address: &Address) -> Option<u32> {
		self.owned.get(address).copied()
	}
}
