//! Identifiers and primitive value types shared across the wallet kernel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hash of a root public key; identifies one HD wallet root.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootId(pub String);

impl RootId {
	pub fn from_pub_key_hash(hash: &[u8]) -> Self {
		RootId(hex_lower(hash))
	}
}

impl fmt::Display for RootId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// `WalletId` currently coincides with `RootId` for HD-random wallets (§3).
pub type WalletId = RootId;

/// `AccountId = (RootId, index)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId {
	pub root_id: RootId,
	pub index: u32,
}

impl AccountId {
	pub fn new(root_id: RootId, index: u32) -> Self {
		AccountId { root_id, index }
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.root_id, self.index)
	}
}

/// Hash of a transaction, as produced by the ledger the kernel is wired to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Locally generated identifier for a pending (not yet confirmed) transaction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId(pub uuid::Uuid);

impl TxId {
	pub fn new() -> Self {
		TxId(uuid::Uuid::new_v4())
	}
}

impl fmt::Display for TxId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// `Input = (TxHash, OutputIndex)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input {
	pub tx_hash: TxHash,
	pub output_index: u32,
}

impl Input {
	pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
		Input {
			tx_hash,
			output_index,
		}
	}
}

impl fmt::Display for Input {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.tx_hash, self.output_index)
	}
}

/// Destination address, opaque beyond its string form (address-scheme crypto
/// is out of scope; see `crate::keys`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub String);

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A ledger amount. Invariant (enforced by callers building an `Output`):
/// always positive.
pub type Amount = u64;

/// Chain slot / block height.
pub type Slot = u64;

fn hex_lower(bytes: &[u8]) -> String {
	let mut s = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		s.push_str(&format!("{:02x}", b));
	}
	s
}
