/// One per-URL visit aggregate. Exactly one row per url.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct HistoryRecord {
	pub url: String,
	pub title: String,
	pub last_visit_time: i64,
	pub visit_count: i64,
}

/// One per-(mode, input, url) selection aggregate. `id` is the composite key
/// `mode|input|url`; `input` is stored already normalized.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct UsageRecord {
	pub id: String,
	pub mode: String,
	pub input: String,
	pub url: String,
	pub use_count: i64,
	pub last_used: i64,
}

/// The single versioned blob of one settings store.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct SettingsRow {
	pub store: String,
	pub version: i64,
	pub data: String,
	pub last_saved_from: String,
}
