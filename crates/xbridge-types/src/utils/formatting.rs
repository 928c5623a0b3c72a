//! String formatting helpers for hex values and identifiers.

/// Ensures a hex string carries a `0x` prefix.
pub fn with_0x_prefix(s: &str) -> String {
	if s.starts_with("0x") {
		s.to_string()
	} else {
		format!("0x{}", s)
	}
}

/// Strips a leading `0x` prefix if present.
pub fn without_0x_prefix(s: &str) -> &str {
	s.strip_prefix("0x").unwrap_or(s)
}

/// Shortens an id for log output, keeping the head and tail.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 12 {
		return id.to_string();
	}
	format!("{}..{}", &id[..8], &id[id.len() - 4..])
}
