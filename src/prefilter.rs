//! Prefilter (§4.1): projects a resolved block onto per-account views.
//!
//! Two equivalent entry points are exposed: [`prefilter_naive`], which walks
//! the block once per ESK, and [`prefilter_folded`], which folds once over
//! the block's transactions against the whole ESK map. The kernels call the
//! folded variant; the naive one exists so a test can cross-check the two
//! agree (§9, resolved).

use std::collections::HashMap;

use crate::keys::Esk;
use crate::model::{AccountId, Input, Output, PrefilteredBlock, ResolvedBlock, RootId, WalletId};

/// Projects `block` under a single `(WalletId, Esk)` pair.
pub fn prefilter_one(block: &ResolvedBlock, wallet_id: &WalletId, esk: &Esk) -> HashMap<AccountId, PrefilteredBlock> {
	let mut out: HashMap<AccountId, PrefilteredBlock> = HashMap::new();

	for tx in &block.transactions {
		for (input, owner_address) in &tx.resolved_inputs {
			if let Some(account_index) = esk.owning_account_index(owner_address) {
				let account_id = AccountId::new(wallet_id.clone(), account_index);
				out.entry(account_id).or_default().spent_inputs.push(input.clone());
			}
		}
		for (output_index, address, amount) in &tx.outputs {
			if let Some(account_index) = esk.owning_account_index(address) {
				let account_id = AccountId::new(wallet_id.clone(), account_index);
				let input = Input::new(tx.tx_hash.clone(), *output_index);
				let output = Output::new(address.clone(), *amount);
				out.entry(account_id).or_default().new_outputs.push((input, output));
			}
		}
	}

	out
}

/// Runs [`prefilter_one`] against every ESK in `esks`, then merges the
/// per-ESK results by disjoint union over `AccountId` (§4.1): account sets
/// from distinct roots cannot collide because `AccountId` embeds `RootId`.
pub fn prefilter_naive(block: &ResolvedBlock, esks: &[(WalletId, Esk)]) -> HashMap<AccountId, PrefilteredBlock> {
	let mut merged: HashMap<AccountId, PrefilteredBlock> = HashMap::new();
	for (wallet_id, esk) in esks {
		for (account_id, prefiltered) in prefilter_one(block, wallet_id, esk) {
			merge_into(&mut merged, account_id, prefiltered);
		}
	}
	merged
}

/// Folds once over the block's transactions, checking every input/output
/// against every ESK in `esks` as it goes, instead of making one block pass
/// per ESK (§4.1 "Optimization note"). Produces the same result as
/// [`prefilter_naive`], verified by a dedicated equivalence test.
pub fn prefilter_folded(block: &ResolvedBlock, esks: &[(WalletId, Esk)]) -> HashMap<AccountId, PrefilteredBlock> {
	let mut out: HashMap<AccountId, PrefilteredBlock> = HashMap::new();

	for tx in &block.transactions {
		for (input, owner_address) in &tx.resolved_inputs {
			if let Some((wallet_id, account_index)) = find_owner(esks, owner_address) {
				let account_id = AccountId::new(wallet_id, account_index);
				out.entry(account_id).or_default().spent_inputs.push(input.clone());
			}
		}
		for (output_index, address, amount) in &tx.outputs {
			if let Some((wallet_id, account_index)) = find_owner(esks, address) {
				let account_id = AccountId::new(wallet_id, account_index);
				let input = Input::new(tx.tx_hash.clone(), *output_index);
				let output = Output::new(address.clone(), *amount);
				out.entry(account_id).or_default().new_outputs.push((input, output));
			}
		}
	}

	out
}

fn find_owner(esks: &[(WalletId, Esk)], address: &crate::model::Address) -> Option<(RootId, u32)> {
	for (wallet_id, esk) in esks {
		if let Some(index) = esk.owning_account_index(address) {
			return Some((wallet_id.clone(), index));
		}
	}
	None
}

fn merge_into(merged: &mut HashMap<AccountId, PrefilteredBlock>, account_id: AccountId, incoming: PrefilteredBlock) {
	let entry = merged.entry(account_id).or_default();
	entry.spent_inputs.extend(incoming.spent_inputs);
	entry.new_outputs.extend(incoming.new_outputs);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::keys::FakeKeyDerivation;
	use crate::model::{Address, BlockMeta, ResolvedTx, TxHash};

	fn addr(s: &str) -> Address {
		Address(s.to_string())
	}

	fn sample_block() -> ResolvedBlock {
		ResolvedBlock {
			meta: BlockMeta::default(),
			transactions: vec![
				ResolvedTx {
					tx_hash: TxHash("tx1".into()),
					resolved_inputs: vec![(Input::new(TxHash("prev".into()), 0), addr("alice-0"))],
					outputs: vec![(0, addr("bob-0"), 100), (1, addr("unknown"), 5)],
				},
				ResolvedTx {
					tx_hash: TxHash("tx2".into()),
					resolved_inputs: vec![],
					outputs: vec![(0, addr("alice-1"), 40)],
				},
			],
		}
	}

	fn esks() -> Vec<(WalletId, Esk)> {
		let alice = Esk::new(FakeKeyDerivation::new().owning(addr("alice-0"), 0).owning(addr("alice-1"), 1));
		let bob = Esk::new(FakeKeyDerivation::new().owning(addr("bob-0"), 0));
		vec![(RootId("alice".into()), alice), (RootId("bob".into()), bob)]
	}

	#[test]
	fn naive_and_folded_agree() {
		let block = sample_block();
		let esks = esks();

		let naive = prefilter_naive(&block, &esks);
		let folded = prefilter_folded(&block, &esks);

		assert_eq!(naive.len(), folded.len());
		for (account_id, prefiltered) in &naive {
			let other = folded.get(account_id).expect("account present in folded result");
			assert_eq!(prefiltered.spent_inputs, other.spent_inputs);
			assert_eq!(prefiltered.new_outputs, other.new_outputs);
		}
	}

	#[test]
	fn spends_and_credits_are_assigned_to_the_right_account() {
		let block = sample_block();
		let esks = esks();
		let result = prefilter_folded(&block, &esks);

		let alice0 = result.get(&AccountId::new(RootId("alice".into()), 0)).unwrap();
		assert_eq!(alice0.spent_inputs, vec![Input::new(TxHash("prev".into()), 0)]);

		let alice1 = result.get(&AccountId::new(RootId("alice".into()), 1)).unwrap();
		assert_eq!(alice1.new_outputs.len(), 1);
		assert_eq!(alice1.new_outputs[0].1.amount, 40);

		let bob0 = result.get(&AccountId::new(RootId("bob".into()), 0)).unwrap();
		assert_eq!(bob0.new_outputs.len(), 1);
		assert_eq!(bob0.new_outputs[0].1.amount, 100);
	}

	#[test]
	fn unowned_addresses_are_skipped() {
		let block = sample_block();
		let esks = esks();
		let result = prefilter_folded(&block, &esks);
		let total_outputs: usize = result.values().map(|p| p.new_outputs.len()).sum();
		assert_eq!(total_outputs, 2);
	}
}
