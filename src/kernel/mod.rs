//! The Passive and Active Kernels (§4.3, §4.5): the two public entry points
//! that compose the lower-level components into something an application
//! embeds directly.

pub mod active;
pub mod passive;

pub use self::active::{bracket_active_wallet, ActiveKernel, TickerGuard};
pub use self::passive::{GenesisUtxoEntry, PassiveKernel};
