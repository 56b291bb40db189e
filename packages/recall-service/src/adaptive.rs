//! Adaptive ranking cache: an in-memory index of per-query selection history,
//! mirrored by the durable usage-record store. The index is the authority for
//! reads; the store is what survives restarts.

use std::sync::RwLock;

use ahash::AHashMap;

use recall_domain::{
	CLEANUP_THRESHOLD, DAY_MS, ENTRY_MAX_AGE_DAYS, Mode, NOISE_FLOOR, calculate_boost,
	normalize_input, now_ms, usage_id,
};
use recall_storage::{db::Db, models::UsageRecord, usage};

use crate::{Error, Result};

const SWEEP_BATCH: i64 = 200;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CacheState {
	Uninitialized,
	Loading,
	Ready,
}

#[derive(Clone, Copy, Debug)]
struct Usage {
	use_count: i64,
	last_used: i64,
}

#[derive(Debug)]
struct Index {
	state: CacheState,
	buckets: AHashMap<(Mode, String), AHashMap<String, Usage>>,
}
impl Index {
	fn total_entries(&self) -> usize {
		self.buckets.values().map(|bucket| bucket.len()).sum()
	}

	fn remove_entry(&mut self, mode: Mode, input: &str, url: &str) {
		let key = (mode, input.to_string());

		if let Some(bucket) = self.buckets.get_mut(&key) {
			bucket.remove(url);

			if bucket.is_empty() {
				self.buckets.remove(&key);
			}
		}
	}
}

/// Per-mode entry counts for the stats surface.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct ModeBreakdown {
	pub tabs: usize,
	pub history: usize,
	pub bookmarks: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
pub struct AdaptiveStats {
	pub total_entries: usize,
	pub unique_inputs: usize,
	pub mode_breakdown: ModeBreakdown,
}

pub struct AdaptiveCache {
	db: Db,
	index: RwLock<Index>,
}
impl AdaptiveCache {
	pub fn new(db: Db) -> Self {
		Self {
			db,
			index: RwLock::new(Index { state: CacheState::Uninitialized, buckets: AHashMap::new() }),
		}
	}

	/// Rebuilds the in-memory index from a full scan of the usage store. On a
	/// scan error the cache stays in `Loading` and the call fails; reads then
	/// degrade to empty results instead of serving a half-built index.
	pub async fn initialize(&self) -> Result<()> {
		{
			let mut index = self.write_index();

			index.state = CacheState::Loading;
			index.buckets = AHashMap::new();
		}

		let records = usage::all(&self.db).await.map_err(|err| {
			tracing::error!(error = %err, "Failed to load usage records.");

			Error::from(err)
		})?;
		let mut index = self.write_index();

		for record in records {
			// Rows written by builds with other mode sets are skipped, not guessed at.
			let Some(mode) = Mode::from_db_str(&record.mode) else {
				continue;
			};

			index
				.buckets
				.entry((mode, record.input))
				.or_default()
				.insert(record.url, Usage { use_count: record.use_count, last_used: record.last_used });
		}

		index.state = CacheState::Ready;

		Ok(())
	}

	pub fn is_loaded(&self) -> bool {
		self.read_index().state == CacheState::Ready
	}

	/// Records one selection: increments the in-memory entry and issues an
	/// atomic durable increment, so concurrent contexts never lose a count.
	/// The two writes are deliberately not transactional with each other; a
	/// crash between them is healed by the next full reload.
	pub async fn record(&self, raw_input: &str, url: &str, mode: Mode) -> Result<()> {
		let input = normalize_input(raw_input);

		if input.is_empty() || url.is_empty() {
			return Ok(());
		}

		let now = now_ms();
		let total_entries = {
			let mut index = self.write_index();

			if index.state != CacheState::Ready {
				return Err(Error::NotReady {
					message: "Adaptive cache has not been initialized.".to_string(),
				});
			}

			let bucket = index.buckets.entry((mode, input.clone())).or_default();

			bucket
				.entry(url.to_string())
				.and_modify(|usage| {
					usage.use_count += 1;
					usage.last_used = now;
				})
				.or_insert(Usage { use_count: 1, last_used: now });

			index.total_entries()
		};
		let record = UsageRecord {
			id: usage_id(mode, &input, url),
			mode: mode.as_str().to_string(),
			input,
			url: url.to_string(),
			use_count: 1,
			last_used: now,
		};

		usage::bump(&self.db, &record).await?;

		if total_entries > CLEANUP_THRESHOLD
			&& let Err(err) = self.cleanup_old_entries().await
		{
			// Growth stays bounded by the next trigger; losing one sweep is fine.
			tracing::warn!(error = %err, "Adaptive cleanup sweep failed.");
		}

		Ok(())
	}

	/// Boost multipliers for every url previously chosen for this query.
	/// Served entirely from the in-memory index; an unready cache yields an
	/// empty map so ranking degrades instead of blocking.
	pub fn get_boosts(&self, raw_input: &str, mode: Mode) -> AHashMap<String, f64> {
		let index = self.read_index();

		if index.state != CacheState::Ready {
			return AHashMap::new();
		}

		let input = normalize_input(raw_input);
		let Some(bucket) = index.buckets.get(&(mode, input)) else {
			return AHashMap::new();
		};
		let now = now_ms();
		let mut boosts = AHashMap::new();

		for (url, usage) in bucket {
			let boost = calculate_boost(usage.use_count, usage.last_used, now, mode);

			if boost > NOISE_FLOOR {
				boosts.insert(url.clone(), 1.0 + boost);
			}
		}

		boosts
	}

	/// Removes every entry for `url` from the index and the durable store,
	/// e.g. when the user deletes the page from history or bookmarks.
	pub async fn remove_url(&self, url: &str) -> Result<()> {
		{
			let mut index = self.write_index();

			if index.state != CacheState::Ready {
				return Err(Error::NotReady {
					message: "Adaptive cache has not been initialized.".to_string(),
				});
			}

			index.buckets.retain(|_, bucket| {
				bucket.remove(url);

				!bucket.is_empty()
			});
		}

		usage::delete_by_url(&self.db, url).await?;

		Ok(())
	}

	/// Deletes durable records older than the retention window in bounded
	/// batches over the last-used index, mirroring each deletion into the
	/// in-memory index so no full reload is needed.
	pub async fn cleanup_old_entries(&self) -> Result<()> {
		let cutoff = now_ms() - ENTRY_MAX_AGE_DAYS * DAY_MS;

		loop {
			let batch = usage::stale_batch(&self.db, cutoff, SWEEP_BATCH).await?;

			if batch.is_empty() {
				return Ok(());
			}

			for record in batch {
				usage::delete(&self.db, &record.id).await?;

				if let Some(mode) = Mode::from_db_str(&record.mode) {
					self.write_index().remove_entry(mode, &record.input, &record.url);
				}
			}
		}
	}

	/// A single pass over the in-memory index; never touches the store.
	pub fn get_stats(&self) -> AdaptiveStats {
		let index = self.read_index();
		let mut breakdown = ModeBreakdown::default();
		let mut total_entries = 0;

		for ((mode, _), bucket) in &index.buckets {
			total_entries += bucket.len();

			match mode {
				Mode::Tabs => breakdown.tabs += bucket.len(),
				Mode::History => breakdown.history += bucket.len(),
				Mode::Bookmarks => breakdown.bookmarks += bucket.len(),
			}
		}

		AdaptiveStats {
			total_entries,
			unique_inputs: index.buckets.len(),
			mode_breakdown: breakdown,
		}
	}

	pub async fn clear(&self) -> Result<()> {
		{
			let mut index = self.write_index();

			if index.state != CacheState::Ready {
				return Err(Error::NotReady {
					message: "Adaptive cache has not been initialized.".to_string(),
				});
			}

			index.buckets = AHashMap::new();
		}

		usage::clear(&self.db).await?;

		Ok(())
	}

	fn read_index(&self) -> std::sync::RwLockReadGuard<'_, Index> {
		self.index.read().unwrap_or_else(|err| err.into_inner())
	}

	fn write_index(&self) -> std::sync::RwLockWriteGuard<'_, Index> {
		self.index.write().unwrap_or_else(|err| err.into_inner())
	}
}
