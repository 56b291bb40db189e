//! Long-term history store: per-URL visit aggregates that outlive the host's
//! own retention window, seeded once from the host provider and extendable
//! from a tab-separated interchange dump.

use std::fmt;

use ahash::AHashMap;

use recall_domain::now_ms;
use recall_storage::{db::Db, history, meta, models::HistoryRecord};

use crate::{Result, VisitItem, VisitProvider, VisitQuery};

const INITIALIZED_FLAG: &str = "history_initialized";

/// Outcome of an import, with a message fit for the options surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
pub struct ImportReport {
	pub imported: usize,
}
impl fmt::Display for ImportReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Imported {} records.", self.imported)
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
pub struct HistoryStats {
	pub total_items: i64,
}

pub struct HistoryStore {
	db: Db,
	import: recall_config::Import,
}
impl HistoryStore {
	pub fn new(db: Db, import: recall_config::Import) -> Self {
		Self { db, import }
	}

	/// One-time seeding: if the durable marker is unset, pull recent visits
	/// from the host provider and set the marker. Best effort by design; any
	/// failure is logged and swallowed, leaving the store usable but unseeded
	/// (and the marker unset, so the next launch retries).
	pub async fn initialize(&self, provider: &dyn VisitProvider) -> Result<()> {
		match meta::get_flag(&self.db, INITIALIZED_FLAG).await {
			Ok(true) => return Ok(()),
			Ok(false) => {},
			Err(err) => {
				tracing::error!(error = %err, "Failed to read the history init marker.");

				return Ok(());
			},
		}

		match self.import_from_provider(provider).await {
			Ok(report) => {
				tracing::info!(imported = report.imported, "Seeded history from the host provider.");

				if let Err(err) = meta::set_flag(&self.db, INITIALIZED_FLAG, true).await {
					tracing::error!(error = %err, "Failed to set the history init marker.");
				}
			},
			Err(err) => {
				tracing::error!(error = %err, "Initial history import failed.");
			},
		}

		Ok(())
	}

	/// Pages backward from now through the provider, a bounded number of
	/// pages, then merges everything as one batch. Intentionally not
	/// exhaustive; the cap bounds first-launch cost.
	pub async fn import_from_provider(&self, provider: &dyn VisitProvider) -> Result<ImportReport> {
		let mut items = Vec::new();
		let mut end_time = now_ms();

		for _ in 0..self.import.max_pages {
			let page = provider
				.search(&VisitQuery {
					text: String::new(),
					start_time: 0,
					end_time,
					max_results: self.import.page_size,
				})
				.await?;
			let Some(last) = page.last() else {
				break;
			};

			end_time = last.last_visit_time.unwrap_or(end_time);

			items.extend(page);
		}

		let records = items
			.into_iter()
			.map(|item| HistoryRecord {
				url: item.url,
				title: item.title,
				last_visit_time: item.last_visit_time.unwrap_or(0),
				visit_count: item.visit_count.unwrap_or(1).max(1),
			})
			.collect::<Vec<_>>();

		self.merge_import(&records).await
	}

	/// Records one live navigation event. Unlike the bulk merge below, the
	/// visit count always advances by exactly one, regardless of any count
	/// carried by the item itself.
	pub async fn add_visit(&self, item: &VisitItem) -> Result<()> {
		if item.url.is_empty() {
			return Err(crate::Error::InvalidRequest {
				message: "A visit requires a url.".to_string(),
			});
		}

		let now = now_ms();
		let mut tx = self.db.pool.begin().await?;
		let record = match history::fetch_tx(&mut *tx, &item.url).await? {
			Some(existing) => HistoryRecord {
				url: item.url.clone(),
				title: if item.title.is_empty() { existing.title } else { item.title.clone() },
				last_visit_time: item.last_visit_time.unwrap_or(now).max(existing.last_visit_time),
				visit_count: existing.visit_count + 1,
			},
			None => HistoryRecord {
				url: item.url.clone(),
				title: item.title.clone(),
				last_visit_time: item.last_visit_time.unwrap_or(now),
				visit_count: 1,
			},
		};

		history::put_tx(&mut *tx, &record).await?;
		tx.commit().await?;

		Ok(())
	}

	/// Merges a batch of aggregates inside one transaction. Counts are summed
	/// (a batch item already aggregates multiple visits), the newest visit
	/// time wins, and an empty candidate title falls back to the stored one.
	/// The whole batch commits or fails together.
	pub async fn merge_import(&self, items: &[HistoryRecord]) -> Result<ImportReport> {
		if items.is_empty() {
			return Ok(ImportReport { imported: 0 });
		}

		let mut tx = self.db.pool.begin().await?;
		let mut imported = 0;

		for item in items {
			let merged = match history::fetch_tx(&mut *tx, &item.url).await? {
				Some(existing) => HistoryRecord {
					url: item.url.clone(),
					title: if item.title.is_empty() {
						existing.title
					} else {
						item.title.clone()
					},
					last_visit_time: item.last_visit_time.max(existing.last_visit_time),
					visit_count: existing.visit_count + item.visit_count.max(1),
				},
				None => HistoryRecord {
					url: item.url.clone(),
					title: item.title.clone(),
					last_visit_time: item.last_visit_time,
					visit_count: item.visit_count.max(1),
				},
			};

			history::put_tx(&mut *tx, &merged).await?;

			imported += 1;
		}

		tx.commit().await?;

		Ok(ImportReport { imported })
	}

	/// Parses the tab-separated interchange dump: `url⇥timestamp⇥…⇥title` per
	/// line, timestamp optionally prefixed with a `U` marker. Malformed lines
	/// are skipped. Lines are aggregated by url in memory first, so duplicate
	/// lines for one url cost one durable write, not one per line.
	pub async fn import_from_text(&self, content: &str) -> Result<ImportReport> {
		let mut aggregated: AHashMap<&str, HistoryRecord> = AHashMap::new();

		for line in content.lines() {
			let fields = line.split('\t').collect::<Vec<_>>();

			if fields.len() < 4 {
				continue;
			}

			let (url, raw_time, title) = (fields[0], fields[1], fields[3]);
			let Some(visit_time) = parse_marked_timestamp(raw_time) else {
				continue;
			};

			match aggregated.get_mut(url) {
				Some(existing) => {
					existing.visit_count += 1;

					if visit_time > existing.last_visit_time {
						existing.last_visit_time = visit_time;

						if !title.is_empty() {
							existing.title = title.to_string();
						}
					}
				},
				None => {
					aggregated.insert(url, HistoryRecord {
						url: url.to_string(),
						title: title.to_string(),
						last_visit_time: visit_time,
						visit_count: 1,
					});
				},
			}
		}

		let items = aggregated.into_values().collect::<Vec<_>>();

		self.merge_import(&items).await
	}

	/// Up to `max_results` records, newest first, via the time index.
	pub async fn search(&self, max_results: i64) -> Result<Vec<HistoryRecord>> {
		if max_results <= 0 {
			return Ok(Vec::new());
		}

		Ok(history::recent(&self.db, max_results).await?)
	}

	pub async fn remove(&self, url: &str) -> Result<()> {
		Ok(history::delete(&self.db, url).await?)
	}

	pub async fn clear(&self) -> Result<()> {
		Ok(history::clear(&self.db).await?)
	}

	pub async fn get_stats(&self) -> Result<HistoryStats> {
		Ok(HistoryStats { total_items: history::count(&self.db).await? })
	}
}

/// Decimal epoch-ms timestamp, optionally prefixed by the `U` marker the
/// interchange format uses; fractional values are floored.
fn parse_marked_timestamp(raw: &str) -> Option<i64> {
	let digits = raw.strip_prefix('U').unwrap_or(raw);

	digits.parse::<f64>().ok().filter(|time| time.is_finite()).map(|time| time.floor() as i64)
}
