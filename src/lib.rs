//! A transactional, in-memory wallet state core for a UTxO-based ledger,
//! its pending-transaction submission layer, and an input-selection
//! evaluation harness (§1).
//!
//! The crate exposes no binary target, no RPC surface, and no network code
//! (§6, §10): `Diffusion`, `Logger`, and `Clock` are the only seams an
//! embedding application fills in.

pub mod clock;
pub mod config;
pub mod diffusion;
pub mod error;
pub mod kernel;
pub mod keys;
pub mod logger;
pub mod model;
pub mod prefilter;
pub mod selection;
pub mod store;
pub mod submission;

pub use crate::error::{Error, Result};
pub use crate::kernel::{bracket_active_wallet, ActiveKernel, GenesisUtxoEntry, PassiveKernel, TickerGuard};
