/// Canonicalizes raw query text before it is used as an index key: trim,
/// lower-case, and collapse internal whitespace runs to a single space.
pub fn normalize_input(input: &str) -> String {
	input.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}
