pub mod adaptive;
pub mod history;
pub mod settings;

mod error;

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

pub use adaptive::{AdaptiveCache, AdaptiveStats, ModeBreakdown};
pub use error::{Error, Result};
pub use history::{HistoryStats, HistoryStore, ImportReport};
pub use settings::{SettingsFailure, SettingsOptions, SettingsStore, failed_settings};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Query against the host's native "recent visits" provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisitQuery {
	pub text: String,
	pub start_time: i64,
	pub end_time: i64,
	pub max_results: u32,
}

/// One visit aggregate as reported by the host or a live navigation event.
/// Missing fields keep the host's loosely-shaped payloads representable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VisitItem {
	pub url: String,
	#[serde(default)]
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_visit_time: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub visit_count: Option<i64>,
}

/// The host's paginated history source, consumed once at first launch.
pub trait VisitProvider
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, query: &'a VisitQuery) -> BoxFuture<'a, Result<Vec<VisitItem>>>;
}
