use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;

/// Weighted multiset of observed outcomes for one prefix.
///
/// Every observation is kept in arrival order, so a value seen `k` times
/// occupies `k` slots and a uniform pick over the slots is a pick weighted
/// by frequency. Per-value counts are tracked alongside for inspection.
///
/// Adding, drawing and counting are all O(1).
///
/// ## Invariants
/// - `observations` holds each value exactly `counts[value]` times
/// - Every stored count is strictly positive
#[derive(Clone, Debug, PartialEq)]
pub struct Transitions<T: Eq + Hash> {
	observations: Vec<T>,
	counts: HashMap<T, usize>,
}

impl<T: Eq + Hash> Default for Transitions<T> {
	fn default() -> Self {
		Self { observations: Vec::new(), counts: HashMap::new() }
	}
}

impl<T: Copy + Eq + Hash> Transitions<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one more observation of `value`.
	pub fn add(&mut self, value: T) {
		self.observations.push(value);
		*self.counts.entry(value).or_insert(0) += 1;
	}

	/// Total number of observations.
	pub fn total(&self) -> usize {
		self.observations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.observations.is_empty()
	}

	/// Observation count of `value`, zero if never seen.
	pub fn count(&self, value: T) -> usize {
		self.counts.get(&value).copied().unwrap_or(0)
	}

	/// Picks a value with probability proportional to its count.
	///
	/// Returns `None` if nothing was ever observed.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
		if self.observations.is_empty() {
			return None;
		}
		Some(self.observations[rng.random_range(0..self.observations.len())])
	}

	/// Adds every observation of `other`, mapping its values through `map`.
	///
	/// Observations are appended in `other`'s arrival order, so merging
	/// partial sets in order gives the set a single pass would have built.
	pub fn merge_with<U, F>(&mut self, other: &Transitions<U>, mut map: F)
	where
		U: Copy + Eq + Hash,
		F: FnMut(U) -> T,
	{
		self.observations.reserve(other.observations.len());
		for value in &other.observations {
			self.add(map(*value));
		}
	}
}
