//! Per-account transaction history (§3, ambient supplement).
//!
//! Mirrors the shape a UTxO wallet's activity feed needs: every mutation
//! that moves funds in or out of an account appends one entry here. Not
//! load-bearing for any invariant in the spec, but without it there is no
//! way to answer "what happened to my balance" short of diffing UTxO sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{Amount, TxId};

/// Coarse classification of a history entry. `Account.pending` only ever
/// tracks this account's own locally-submitted outgoing transactions (§3),
/// so there is no incoming-pending-transaction case to cancel — just the
/// receive/send × confirmed/(send-)cancelled entries below.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxLogEntryKind {
	/// Outputs credited to this account by a confirmed block.
	Received,
	/// Outputs locked (and any change produced) when a pending transaction
	/// was submitted by this account.
	Sent,
	/// A previously-pending sent transaction was cancelled (by the
	/// submission layer or by the store observing a double-spend).
	SentCancelled,
}

/// One entry in an account's transaction history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxLogEntry {
	/// Local, per-account sequence id (distinct from any chain-level `TxId`).
	pub id: u32,
	/// The submission-layer `TxId` this entry is associated with, if any.
	pub tx_id: Option<TxId>,
	pub kind: TxLogEntryKind,
	pub amount_credited: Amount,
	pub amount_debited: Amount,
	pub creation_ts: DateTime<Utc>,
	pub confirmation_ts: Option<DateTime<Utc>>,
}

impl TxLogEntry {
	pub fn new(id: u32, kind: TxLogEntryKind) -> Self {
		TxLogEntry {
			id,
			tx_id: None,
			kind,
			amount_credited: 0,
			amount_debited: 0,
			creation_ts: Utc::now(),
			confirmation_ts: None,
		}
	}

	pub fn confirm_now(&mut self) {
		self.confirmation_ts = Some(Utc::now());
	}
}
