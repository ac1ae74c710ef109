//! Error taxonomy (§7). Each component boundary gets its own small tagged
//! enum; a crate-wide `Error`/`Result` alias exists for callers (the active
//! kernel's ticker, mainly) that need to bubble up errors from more than one
//! component through a single path.

use failure::Fail;

use crate::model::{AccountId, Input, RootId};

/// From `HdWalletStore::create_hd_wallet` (§4.2.1).
#[derive(Clone, Debug, Fail, PartialEq, Eq)]
pub enum CreateHdRootError {
	#[fail(display = "root already exists: {}", _0)]
	RootAlreadyExists(RootId),
}

/// From `HdWalletStore::new_pending` (§4.2.3) and `ActiveKernel::new_pending`
/// (§4.5).
#[derive(Clone, Debug, Fail, PartialEq, Eq)]
pub enum NewPendingError {
	#[fail(display = "unknown account: {}", _0)]
	UnknownAccount(AccountId),
	#[fail(display = "inputs unavailable: {:?}", _0)]
	InputsUnavailable(Vec<Input>),
}

/// From the store's read queries (§4.2 "Read queries").
#[derive(Clone, Debug, Fail, PartialEq, Eq)]
pub enum QueryError {
	#[fail(display = "unknown root: {}", _0)]
	UnknownRoot(RootId),
	#[fail(display = "unknown account: {}", _0)]
	UnknownAccount(AccountId),
}

/// From the input-selection evaluation harness (§4.6).
#[derive(Clone, Debug, Fail, PartialEq, Eq)]
pub enum PolicyError {
	#[fail(display = "insufficient funds: need {}, have {}", needed, available)]
	InsufficientFunds { needed: u64, available: u64 },
	#[fail(display = "no suitable inputs for the requested outputs")]
	NoSuitableInputs,
}

/// Opaque diffusion failure (§7); the submission layer treats any `SendError`
/// as "try again later" and never inspects its contents.
#[derive(Clone, Debug, Fail)]
#[fail(display = "diffusion send failed: {}", _0)]
pub struct SendError(pub String);

/// Crate-wide error, for call sites that can fail for more than one of the
/// above reasons (the active kernel's ticker, mainly).
#[derive(Debug, Fail)]
pub enum Error {
	#[fail(display = "{}", _0)]
	Create(#[cause] CreateHdRootError),
	#[fail(display = "{}", _0)]
	NewPending(#[cause] NewPendingError),
	#[fail(display = "{}", _0)]
	Query(#[cause] QueryError),
	#[fail(display = "{}", _0)]
	Policy(#[cause] PolicyError),
	#[fail(display = "{}", _0)]
	Send(#[cause] SendError),
}

impl From<CreateHdRootError> for Error {
	fn from(e: CreateHdRootError) -> Self {
		Error::Create(e)
	}
}

impl From<NewPendingError> for Error {
	fn from(e: NewPendingError) -> Self {
		Error::NewPending(e)
	}
}

impl From<QueryError> for Error {
	fn from(e: QueryError) -> Self {
		Error::Query(e)
	}
}

impl From<PolicyError> for Error {
	fn from(e: PolicyError) -> Self {
		Error::Policy(e)
	}
}

impl From<SendError> for Error {
	fn from(e: SendError) -> Self {
		Error::Send(e)
	}
}

pub type Result<T> = std::result::Result<T, Error>;
