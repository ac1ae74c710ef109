//! Deterministic event-stream simulator for comparing selection policies
//! (§4.6). Three event kinds — `Deposit`, `Pay`, `NextSlot` — drive a
//! policy against an evolving UTxO set and accumulate the stats a caller
//! needs to build histograms and time series.

use std::collections::BTreeMap;

use crate::error::PolicyError;
use crate::model::{Address, Input, Output, TxHash, Utxo};

use super::{InputSelectionPolicy, SelectionStats};

/// How many of the deposits queued since the last `NextSlot` get folded
/// into the live UTxO set (§4.6, resolved open question). `CommitAll` is
/// the default; `CommitFraction(f)` commits a deterministic prefix of the
/// round's pending deposits and defers the rest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommitPolicy {
	CommitAll,
	CommitFraction(f64),
}

impl Default for CommitPolicy {
	fn default() -> Self {
		CommitPolicy::CommitAll
	}
}

impl CommitPolicy {
	fn commit_count(&self, pending_len: usize) -> usize {
		match self {
			CommitPolicy::CommitAll => pending_len,
			CommitPolicy::CommitFraction(f) => {
				let f = f.max(0.0).min(1.0);
				((pending_len as f64) * f).ceil() as usize
			}
		}
	}
}

/// One event in the simulator's input stream.
pub enum Event {
	/// New UTxO entries become available, queued until the next `NextSlot`.
	Deposit(Vec<(Input, Output)>),
	/// Attempt a selection against the currently-confirmed UTxO set.
	Pay(Vec<Output>),
	/// Advances the round, committing queued deposits per `CommitPolicy`.
	NextSlot,
}

/// Drives a single [`InputSelectionPolicy`] across an [`Event`] stream.
pub struct Simulator<P: InputSelectionPolicy> {
	policy: P,
	commit_policy: CommitPolicy,
	change_address: Address,
	utxo: Utxo,
	pending_deposits: Vec<(Input, Output)>,
	records: Vec<Result<SelectionStats, PolicyError>>,
	sim_tx_counter: u64,
}

impl<P: InputSelectionPolicy> Simulator<P> {
	pub fn new(policy: P, commit_policy: CommitPolicy, change_address: Address) -> Self {
		Simulator {
			policy,
			commit_policy,
			change_address,
			utxo: Utxo::new(),
			pending_deposits: Vec::new(),
			records: Vec::new(),
			sim_tx_counter: 0,
		}
	}

	pub fn run(&mut self, events: impl IntoIterator<Item = Event>) {
		for event in events {
			self.apply(event);
		}
	}

	pub fn records(&self) -> &[Result<SelectionStats, PolicyError>] {
		&self.records
	}

	pub fn utxo(&self) -> &Utxo {
		&self.utxo
	}

	/// Frequency of each `inputs_chosen` count among successful selections —
	/// the "histograms" called for in §4.6.
	pub fn input_count_histogram(&self) -> BTreeMap<usize, usize> {
		let mut histogram = BTreeMap::new();
		for stats in self.records.iter().filter_map(|r| r.as_ref().ok()) {
			*histogram.entry(stats.inputs_chosen).or_insert(0) += 1;
		}
		histogram
	}

	pub fn success_count(&self) -> usize {
		self.records.iter().filter(|r| r.is_ok()).count()
	}

	pub fn failure_count(&self) -> usize {
		self.records.iter().filter(|r| r.is_err()).count()
	}

	fn apply(&mut self, event: Event) {
		match event {
			Event::Deposit(entries) => self.pending_deposits.extend(entries),
			Event::Pay(outputs) => {
				let result = self.policy.select(&self.utxo, &outputs, &self.change_address);
				match result {
					Ok((tx, stats)) => {
						for input in &tx.inputs {
							self.utxo.remove(input);
						}
						if stats.change_amount > 0 {
							self.sim_tx_counter += 1;
							let synthetic_input = Input::new(TxHash(format!("sim-change-{}", self.sim_tx_counter)), 0);
							self.utxo
								.insert(synthetic_input, Output::new(self.change_address.clone(), stats.change_amount));
						}
						self.records.push(Ok(stats));
					}
					Err(e) => self.records.push(Err(e)),
				}
			}
			Event::NextSlot => self.commit_pending(),
		}
	}

	fn commit_pending(&mut self) {
		let count = self.commit_policy.commit_count(self.pending_deposits.len());
		let to_commit: Vec<(Input, Output)> = self.pending_deposits.drain(..count).collect();
		for (input, output) in to_commit {
			self.utxo.insert(input, output);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::selection::LargestFirst;

	fn addr(s: &str) -> Address {
		Address(s.to_string())
	}

	#[test]
	fn commit_all_folds_every_deposit_in_immediately() {
		let mut sim = Simulator::new(LargestFirst, CommitPolicy::CommitAll, addr("change"));
		sim.run(vec![
			Event::Deposit(vec![(Input::new(TxHash("h".into()), 0), Output::new(addr("a"), 100))]),
			Event::NextSlot,
		]);
		assert_eq!(sim.utxo().len(), 1);
	}

	#[test]
	fn commit_fraction_defers_the_remainder() {
		let mut sim = Simulator::new(LargestFirst, CommitPolicy::CommitFraction(0.5), addr("change"));
		sim.run(vec![
			Event::Deposit(vec![
				(Input::new(TxHash("h".into()), 0), Output::new(addr("a"), 100)),
				(Input::new(TxHash("h".into()), 1), Output::new(addr("a"), 200)),
			]),
			Event::NextSlot,
		]);
		assert_eq!(sim.utxo().len(), 1, "half of two deposits commits in one entry");

		sim.run(vec![Event::NextSlot]);
		assert_eq!(sim.utxo().len(), 2, "the deferred deposit commits on the next round");
	}

	#[test]
	fn pay_against_uncommitted_deposits_fails() {
		let mut sim = Simulator::new(LargestFirst, CommitPolicy::CommitAll, addr("change"));
		sim.run(vec![
			Event::Deposit(vec![(Input::new(TxHash("h".into()), 0), Output::new(addr("a"), 100))]),
			Event::Pay(vec![Output::new(addr("dest"), 50)]),
		]);
		assert_eq!(sim.failure_count(), 1, "deposit has not committed yet, so utxo is empty");
	}

	#[test]
	fn histogram_tracks_successful_input_counts() {
		let mut sim = Simulator::new(LargestFirst, CommitPolicy::CommitAll, addr("change"));
		sim.run(vec![
			Event::Deposit(vec![
				(Input::new(TxHash("h".into()), 0), Output::new(addr("a"), 100)),
				(Input::new(TxHash("h".into()), 1), Output::new(addr("a"), 50)),
			]),
			Event::NextSlot,
			Event::Pay(vec![Output::new(addr("dest"), 40)]),
			Event::Pay(vec![Output::new(addr("dest"), 100)]),
		]);
		assert_eq!(sim.success_count(), 2);
		let histogram = sim.input_count_histogram();
		assert_eq!(histogram.values().sum::<usize>(), 2);
	}
}
