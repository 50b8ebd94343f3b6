//! Line cleaning applied before tokens reach the interner.

/// Quote character whose unmatched occurrences get stripped.
const QUOTE: char = '"';

/// Returns `true` if `token` may end a sentence (last char is `.` or `?`).
pub fn is_stop_token(token: &str) -> bool {
	token.ends_with('.') || token.ends_with('?')
}

/// Strips one unmatched quote from either end of a token.
///
/// `"word"` stays quoted, `"word` and `word"` both become `word`.
pub fn clean_token(token: &str) -> String {
	let starts = token.starts_with(QUOTE);
	let ends = token.ends_with(QUOTE);

	match (starts, ends) {
		(true, false) => token[QUOTE.len_utf8()..].to_owned(),
		(false, true) => token[..token.len() - QUOTE.len_utf8()].to_owned(),
		_ => token.to_owned(),
	}
}

/// Splits a raw corpus line into cleaned tokens.
///
/// Returns `None` when the line has fewer than `min_tokens` whitespace
/// separated tokens. The last token of a kept line is always a stop token:
/// a `.` is appended unless it already ends in `.` or `?`.
pub fn tokenize_line(line: &str, min_tokens: usize) -> Option<Vec<String>> {
	let raw: Vec<&str> = line.split_whitespace().collect();
	if raw.len() < min_tokens || raw.is_empty() {
		return None;
	}

	let mut tokens: Vec<String> = raw.into_iter().map(clean_token).collect();
	if let Some(last) = tokens.last_mut() {
		if !is_stop_token(last) {
			last.push('.');
		}
	}
	Some(tokens)
}
