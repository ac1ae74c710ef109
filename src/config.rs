//! Configuration layer (§10, ambient). Loaded from TOML the way this
//! codebase's config type is: a plain `Serialize`/`Deserialize` struct with
//! a `Default` impl and `from_str`/`from_file` constructors, rather than a
//! bespoke parser.

use std::fs;
use std::path::Path;

use failure::Fail;
use serde::{Deserialize, Serialize};

use crate::model::AssuranceLevel;
use crate::submission::ResubmitPolicy;

#[derive(Debug, Fail)]
pub enum ConfigError {
	#[fail(display = "could not read config file {}: {}", path, source)]
	Io { path: String, source: String },
	#[fail(display = "could not parse config: {}", _0)]
	Parse(String),
}

/// Resubmission policy tunables (§4.4): exponential backoff with base 1.25,
/// capped at 255 attempts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResubmitPolicyConfig {
	pub backoff_base: f64,
	/// Base wait before the first retry, in microseconds.
	pub base_wait_micros: u64,
	pub max_attempts: u32,
}

impl Default for ResubmitPolicyConfig {
	fn default() -> Self {
		ResubmitPolicyConfig {
			backoff_base: 1.25,
			base_wait_micros: 1,
			max_attempts: 255,
		}
	}
}

impl From<&ResubmitPolicyConfig> for ResubmitPolicy {
	fn from(config: &ResubmitPolicyConfig) -> Self {
		ResubmitPolicy {
			backoff_base: config.backoff_base,
			base_wait: config.base_wait_micros,
			max_attempts: config.max_attempts,
		}
	}
}

/// Top-level kernel configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KernelConfig {
	pub resubmit_policy: ResubmitPolicyConfig,
	/// Assurance level newly created wallets get unless the caller overrides
	/// it explicitly.
	pub default_assurance_level: AssuranceLevel,
	/// Placeholder for a future on-disk persistence adapter (§6
	/// "Persistence"); unused by the in-memory store, kept here so adding a
	/// persistence adapter later does not require a breaking config change.
	pub data_dir: Option<String>,
}

impl Default for KernelConfig {
	fn default() -> Self {
		KernelConfig {
			resubmit_policy: ResubmitPolicyConfig::default(),
			default_assurance_level: AssuranceLevel::Normal,
			data_dir: None,
		}
	}
}

impl KernelConfig {
	pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
		toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
	}

	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let path_ref = path.as_ref();
		let contents = fs::read_to_string(path_ref).map_err(|e| ConfigError::Io {
			path: path_ref.display().to_string(),
			source: e.to_string(),
		})?;
		Self::from_str(&contents)
	}

	pub fn to_toml_string(&self) -> Result<String, ConfigError> {
		toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_matches_spec_backoff_policy() {
		let config = KernelConfig::default();
		assert_eq!(config.resubmit_policy.backoff_base, 1.25);
		assert_eq!(config.resubmit_policy.max_attempts, 255);
	}

	#[test]
	fn round_trips_through_toml() {
		let config = KernelConfig::default();
		let toml_str = config.to_toml_string().unwrap();
		let parsed = KernelConfig::from_str(&toml_str).unwrap();
		assert_eq!(config, parsed);
	}

	#[test]
	fn rejects_malformed_toml() {
		assert!(KernelConfig::from_str("not = [valid").is_err());
	}
}
