use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Opaque identity of an interned token.
///
/// Two handles are equal exactly when the texts they were interned from are
/// equal. Handles are only meaningful for the [`Interner`] that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u32);

impl Token {
	/// Position of the token in its interner's table.
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// Append-only string table handing out [`Token`] handles.
///
/// Each distinct string is allocated once; the lookup map and the id table
/// share the same `Arc<str>`. Handles are 32-bit, which caps a table at
/// `u32::MAX` distinct strings.
///
/// ## Invariants
/// - `strings[t.index()]` is the text `t` was interned from
/// - `ids` and `strings` always hold the same set of strings
#[derive(Debug, Default, Clone)]
pub struct Interner {
	strings: Vec<Arc<str>>,
	ids: HashMap<Arc<str>, Token>,
}

impl Interner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the handle for `text`, allocating it on first sight.
	///
	/// # Panics
	/// Panics when a new string would exceed `u32::MAX` distinct entries.
	pub fn intern(&mut self, text: &str) -> Token {
		if let Some(token) = self.ids.get(text) {
			return *token;
		}

		let token = Token(next_id(self.strings.len()));
		let text: Arc<str> = Arc::from(text);
		self.strings.push(Arc::clone(&text));
		self.ids.insert(text, token);
		token
	}

	/// Looks up an already interned string without inserting it.
	pub fn get(&self, text: &str) -> Option<Token> {
		self.ids.get(text).copied()
	}

	/// Returns the text behind a handle.
	///
	/// # Panics
	/// Panics if `token` was issued by another interner with more entries.
	pub fn resolve(&self, token: Token) -> &str {
		&self.strings[token.index()]
	}

	/// Number of distinct tokens.
	pub fn len(&self) -> usize {
		self.strings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.strings.is_empty()
	}

	/// Iterates over `(handle, text)` pairs in interning order.
	pub fn iter(&self) -> impl Iterator<Item = (Token, &str)> {
		self.strings
			.iter()
			.enumerate()
			.map(|(i, s)| (Token(i as u32), s.as_ref()))
	}

	/// Collects every token whose text contains `word`, ignoring case.
	pub fn matching(&self, word: &str) -> HashSet<Token> {
		let needle = word.to_lowercase();
		self.iter()
			.filter(|(_, text)| text.to_lowercase().contains(&needle))
			.map(|(token, _)| token)
			.collect()
	}
}

/// Handle for the entry at position `len`.
fn next_id(len: usize) -> u32 {
	u32::try_from(len).expect("interner exceeded u32::MAX distinct tokens")
}
