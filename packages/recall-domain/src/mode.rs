use std::fmt;

use serde::{Deserialize, Serialize};

/// Search surface a selection was made from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	Tabs,
	History,
	Bookmarks,
}
impl Mode {
	pub const ALL: [Self; 3] = [Self::Tabs, Self::History, Self::Bookmarks];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Tabs => "tabs",
			Self::History => "history",
			Self::Bookmarks => "bookmarks",
		}
	}

	/// Parses the stored representation. Unknown modes are dropped rather than
	/// folded into a real one, so stale rows written by a newer release are skipped.
	pub fn from_db_str(s: &str) -> Option<Self> {
		match s {
			"tabs" => Some(Self::Tabs),
			"history" => Some(Self::History),
			"bookmarks" => Some(Self::Bookmarks),
			_ => None,
		}
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
