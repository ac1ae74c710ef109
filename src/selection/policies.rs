//! The three provided policies (§4.6): `exact_single_match_only`,
//! `largest_first`, and `random(privacy_mode)`. Each sorts (or shuffles)
//! eligible candidates, then accumulates greedily, simplified to the pure
//! `(utxo, outputs) -> (tx, stats)` contract this harness needs and with no
//! fee estimation (out of scope, §1 Non-goals).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use parking_lot::Mutex;

use crate::error::PolicyError;
use crate::model::{Address, Amount, Input, Output, TxBody, TxId, Utxo};

use super::SelectionStats;

fn requested_amount(outputs: &[Output]) -> Amount {
	outputs.iter().map(|o| o.amount).sum()
}

fn build_tx(inputs: Vec<Input>, mut outputs: Vec<Output>, change: Option<Output>) -> TxBody {
	if let Some(change_output) = change {
		outputs.push(change_output);
	}
	TxBody {
		tx_id: TxId::new(),
		inputs,
		outputs,
	}
}

/// Succeeds only when a single UTxO entry's amount exactly matches the
/// requested total, producing a change-free transaction. This is the
/// cheapest policy on-chain (one input, no change output) but the pickiest
/// about when it can fire.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactSingleMatchOnly;

impl super::InputSelectionPolicy for ExactSingleMatchOnly {
	fn select(
		&self,
		utxo: &Utxo,
		outputs: &[Output],
		_change_address: &Address,
	) -> Result<(TxBody, SelectionStats), PolicyError> {
		let needed = requested_amount(outputs);
		let exact = utxo.iter().find(|(_, out)| out.amount == needed);
		match exact {
			Some((input, _)) => {
				let stats = SelectionStats {
					inputs_chosen: 1,
					payment_amount: needed,
					change_amount: 0,
				};
				Ok((build_tx(vec![input.clone()], outputs.to_vec(), None), stats))
			}
			None => Err(PolicyError::NoSuitableInputs),
		}
	}
}

/// Sorts eligible outputs by decreasing amount and accumulates greedily
/// until the requested amount is covered, minimizing the number of inputs
/// consumed. No `max_outputs` soft cap — this harness has no such limit to
/// honor.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestFirst;

impl super::InputSelectionPolicy for LargestFirst {
	fn select(
		&self,
		utxo: &Utxo,
		outputs: &[Output],
		change_address: &Address,
	) -> Result<(TxBody, SelectionStats), PolicyError> {
		let needed = requested_amount(outputs);
		let mut candidates: Vec<(Input, Output)> = utxo.iter().map(|(i, o)| (i.clone(), o.clone())).collect();
		candidates.sort_by(|a, b| b.1.amount.cmp(&a.1.amount));
		accumulate(candidates, needed, outputs, change_address)
	}
}

/// Same greedy accumulation as [`LargestFirst`], but over a shuffled
/// candidate order. `privacy_mode` additionally randomizes which of several
/// amount-equivalent orderings is used from call to call rather than always
/// preferring the first candidates the shuffle produces — in this
/// simplified model that distinction only affects whether the shuffle uses
/// a fresh or a fixed seed per instance, since there is no wallet-level
/// output-grouping concept to preserve or break.
pub struct RandomSelection {
	privacy_mode: bool,
	rng: Mutex<StdRng>,
}

impl RandomSelection {
	/// Seeds from entropy — every call to `select` draws a different order.
	pub fn new(privacy_mode: bool) -> Self {
		RandomSelection {
			privacy_mode,
			rng: Mutex::new(StdRng::from_entropy()),
		}
	}

	/// Seeds deterministically. Used by the simulator's tests and by anyone
	/// who needs a reproducible evaluation run.
	pub fn with_seed(privacy_mode: bool, seed: u64) -> Self {
		RandomSelection {
			privacy_mode,
			rng: Mutex::new(StdRng::seed_from_u64(seed)),
		}
	}
}

impl super::InputSelectionPolicy for RandomSelection {
	fn select(
		&self,
		utxo: &Utxo,
		outputs: &[Output],
		change_address: &Address,
	) -> Result<(TxBody, SelectionStats), PolicyError> {
		let needed = requested_amount(outputs);
		let mut candidates: Vec<(Input, Output)> = utxo.iter().map(|(i, o)| (i.clone(), o.clone())).collect();
		let mut rng = self.rng.lock();
		candidates.shuffle(&mut *rng);
		if !self.privacy_mode {
			// Without the privacy flag, break ties back towards largest-first so
			// the policy still tends to minimize input count.
			candidates.sort_by(|a, b| b.1.amount.cmp(&a.1.amount));
		}
		accumulate(candidates, needed, outputs, change_address)
	}
}

fn accumulate(
	candidates: Vec<(Input, Output)>,
	needed: Amount,
	requested_outputs: &[Output],
	change_address: &Address,
) -> Result<(TxBody, SelectionStats), PolicyError> {
	let mut chosen = Vec::new();
	let mut total: Amount = 0;
	for (input, output) in candidates {
		if total >= needed {
			break;
		}
		total += output.amount;
		chosen.push(input);
	}

	if total < needed {
		return Err(PolicyError::InsufficientFunds {
			needed,
			available: total,
		});
	}

	let change_amount = total - needed;
	let change = if change_amount > 0 {
		Some(Output::new(change_address.clone(), change_amount))
	} else {
		None
	};
	let stats = SelectionStats {
		inputs_chosen: chosen.len(),
		payment_amount: needed,
		change_amount,
	};
	Ok((build_tx(chosen, requested_outputs.to_vec(), change), stats))
}

#[cfg(test)]
mod tests {
	use super::super::InputSelectionPolicy;
	use super::*;
	use crate::model::TxHash;

	fn addr(s: &str) -> Address {
		Address(s.to_string())
	}

	fn sample_utxo() -> Utxo {
		let mut utxo = Utxo::new();
		utxo.insert(Input::new(TxHash("h".into()), 0), Output::new(addr("a"), 100));
		utxo.insert(Input::new(TxHash("h".into()), 1), Output::new(addr("a"), 250));
		utxo.insert(Input::new(TxHash("h".into()), 2), Output::new(addr("a"), 50));
		utxo
	}

	#[test]
	fn exact_single_match_finds_an_exact_amount() {
		let utxo = sample_utxo();
		let outputs = vec![Output::new(addr("dest"), 250)];
		let (tx, stats) = ExactSingleMatchOnly.select(&utxo, &outputs, &addr("change")).unwrap();
		assert_eq!(tx.inputs, vec![Input::new(TxHash("h".into()), 1)]);
		assert_eq!(stats.change_amount, 0);
	}

	#[test]
	fn exact_single_match_fails_without_an_exact_entry() {
		let utxo = sample_utxo();
		let outputs = vec![Output::new(addr("dest"), 90)];
		let err = ExactSingleMatchOnly.select(&utxo, &outputs, &addr("change")).unwrap_err();
		assert_eq!(err, PolicyError::NoSuitableInputs);
	}

	#[test]
	fn largest_first_minimizes_input_count() {
		let utxo = sample_utxo();
		let outputs = vec![Output::new(addr("dest"), 300)];
		let (tx, stats) = LargestFirst.select(&utxo, &outputs, &addr("change")).unwrap();
		assert_eq!(stats.inputs_chosen, 2, "250 + 100 covers 300 in two inputs");
		assert_eq!(stats.change_amount, 50);
		assert_eq!(tx.inputs.len(), 2);
	}

	#[test]
	fn largest_first_reports_insufficient_funds() {
		let utxo = sample_utxo();
		let outputs = vec![Output::new(addr("dest"), 10_000)];
		let err = LargestFirst.select(&utxo, &outputs, &addr("change")).unwrap_err();
		assert_eq!(
			err,
			PolicyError::InsufficientFunds {
				needed: 10_000,
				available: 400
			}
		);
	}

	#[test]
	fn random_selection_is_deterministic_under_a_fixed_seed() {
		let utxo = sample_utxo();
		let outputs = vec![Output::new(addr("dest"), 150)];
		let a = RandomSelection::with_seed(true, 42)
			.select(&utxo, &outputs, &addr("change"))
			.unwrap();
		let b = RandomSelection::with_seed(true, 42)
			.select(&utxo, &outputs, &addr("change"))
			.unwrap();
		assert_eq!(a.1, b.1);
	}
}
