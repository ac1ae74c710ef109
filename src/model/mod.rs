//! Core data model (§3): identifiers, accounts, blocks, and transaction
//! history.

mod account;
mod ids;
mod tx_log;

pub use self::account::{
	Account, AssuranceLevel, BlockMeta, Output, PrefilteredBlock, ResolvedBlock, ResolvedTx, Root,
	TxBody, Utxo,
};
pub use self::ids::{AccountId, Address, Amount, Input, RootId, Slot, TxHash, TxId, WalletId};
pub use self::tx_log::{TxLogEntry, TxLogEntryKind};
