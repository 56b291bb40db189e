use recall_domain::Mode;
use recall_service::{AdaptiveCache, Error};

#[tokio::test]
async fn records_selections_and_serves_boosts() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db);

	cache.initialize().await.expect("Failed to initialize the cache.");
	cache.record("GitHub", "https://github.com", Mode::Tabs).await.expect("Record failed.");
	cache.record("GitHub", "https://github.com", Mode::Tabs).await.expect("Record failed.");
	cache.record("GitHub", "https://gist.github.com", Mode::Tabs).await.expect("Record failed.");

	let boosts = cache.get_boosts("github", Mode::Tabs);

	assert_eq!(boosts.len(), 2);
	assert!(boosts["https://github.com"] > boosts["https://gist.github.com"]);
	assert!(boosts.values().all(|boost| *boost > 1.0));
	// A different mode is a different bucket.
	assert!(cache.get_boosts("github", Mode::History).is_empty());

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn normalizes_queries_before_bucketing() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db);

	cache.initialize().await.expect("Failed to initialize the cache.");
	cache
		.record("  Rust   Book ", "https://doc.rust-lang.org/book", Mode::History)
		.await
		.expect("Record failed.");

	assert_eq!(cache.get_boosts("rust book", Mode::History).len(), 1);
	assert_eq!(cache.get_boosts("RUST  BOOK", Mode::History).len(), 1);
	assert!(cache.get_boosts("rust", Mode::History).is_empty());

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn boost_is_capped_per_mode() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db);

	cache.initialize().await.expect("Failed to initialize the cache.");

	for _ in 0..20 {
		cache.record("mail", "https://mail.example.com", Mode::Tabs).await.expect("Record failed.");
		cache
			.record("mail", "https://mail.example.com", Mode::History)
			.await
			.expect("Record failed.");
	}

	let tab_boost = cache.get_boosts("mail", Mode::Tabs)["https://mail.example.com"];
	let history_boost = cache.get_boosts("mail", Mode::History)["https://mail.example.com"];

	assert!((tab_boost - 1.25).abs() < 1e-9);
	assert!((history_boost - 1.5).abs() < 1e-9);

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn index_survives_a_restart() {
	let (test_db, db) = super::test_db().await;

	{
		let cache = AdaptiveCache::new(db.clone());

		cache.initialize().await.expect("Failed to initialize the cache.");
		cache.record("news", "https://news.example.com", Mode::Bookmarks).await.expect("Record failed.");
	}

	let reloaded = AdaptiveCache::new(db);

	reloaded.initialize().await.expect("Failed to reload the cache.");

	let boosts = reloaded.get_boosts("news", Mode::Bookmarks);

	assert_eq!(boosts.len(), 1);
	assert!(boosts.contains_key("https://news.example.com"));

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn remove_url_purges_every_bucket_and_the_store() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db.clone());

	cache.initialize().await.expect("Failed to initialize the cache.");
	cache.record("docs", "https://docs.example.com", Mode::Tabs).await.expect("Record failed.");
	cache.record("example", "https://docs.example.com", Mode::History).await.expect("Record failed.");
	cache.record("docs", "https://kept.example.com", Mode::Tabs).await.expect("Record failed.");
	cache.remove_url("https://docs.example.com").await.expect("Remove failed.");

	assert!(!cache.get_boosts("docs", Mode::Tabs).contains_key("https://docs.example.com"));
	assert!(cache.get_boosts("example", Mode::History).is_empty());
	assert!(cache.get_boosts("docs", Mode::Tabs).contains_key("https://kept.example.com"));

	// The durable store was purged too, not just the index.
	let reloaded = AdaptiveCache::new(db);

	reloaded.initialize().await.expect("Failed to reload the cache.");

	assert!(!reloaded.get_boosts("docs", Mode::Tabs).contains_key("https://docs.example.com"));
	assert!(reloaded.get_boosts("example", Mode::History).is_empty());

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn concurrent_contexts_accumulate_every_selection() {
	let (test_db, db) = super::test_db().await;
	// Two caches over one database model two live contexts.
	let first = std::sync::Arc::new(AdaptiveCache::new(db.clone()));
	let second = std::sync::Arc::new(AdaptiveCache::new(db.clone()));

	first.initialize().await.expect("Failed to initialize the cache.");
	second.initialize().await.expect("Failed to initialize the cache.");

	let mut handles = Vec::new();

	for cache in [&first, &second] {
		for _ in 0..10 {
			let cache = cache.clone();

			handles.push(tokio::spawn(async move {
				cache.record("shared", "https://shared.example.com", Mode::History).await
			}));
		}
	}

	for handle in handles {
		handle.await.expect("A writer panicked.").expect("Record failed.");
	}

	// Every selection from both contexts must land in the durable count.
	let id = recall_domain::usage_id(Mode::History, "shared", "https://shared.example.com");
	let stored = recall_storage::usage::fetch(&db, &id)
		.await
		.expect("Fetch failed.")
		.expect("Missing the usage record.");

	assert_eq!(stored.use_count, 20);

	let reloaded = AdaptiveCache::new(db);

	reloaded.initialize().await.expect("Failed to reload the cache.");
	assert!(reloaded.get_boosts("shared", Mode::History).contains_key("https://shared.example.com"));

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn unready_cache_degrades_reads_and_rejects_writes() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db);

	assert!(cache.get_boosts("anything", Mode::Tabs).is_empty());
	assert!(matches!(
		cache.record("anything", "https://example.com", Mode::Tabs).await,
		Err(Error::NotReady { .. })
	));

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn sweep_drops_expired_entries_from_index_and_store() {
	let (test_db, db) = super::test_db().await;
	let now = recall_domain::now_ms();

	// Seed records past the 90-day retention window; high counts keep their
	// boosts above the noise floor, so they are visible until swept.
	for (input, url, age_days) in [
		("old", "https://old.example.com", 100),
		("older", "https://older.example.com", 365),
	] {
		recall_storage::usage::put(&db, &recall_storage::models::UsageRecord {
			id: recall_domain::usage_id(Mode::History, input, url),
			mode: "history".to_string(),
			input: input.to_string(),
			url: url.to_string(),
			use_count: 50,
			last_used: now - age_days * recall_domain::DAY_MS,
		})
		.await
		.expect("Seed failed.");
	}

	let cache = AdaptiveCache::new(db.clone());

	cache.initialize().await.expect("Failed to initialize the cache.");
	cache.record("fresh", "https://fresh.example.com", Mode::History).await.expect("Record failed.");

	assert!(!cache.get_boosts("old", Mode::History).is_empty());

	cache.cleanup_old_entries().await.expect("Sweep failed.");

	// Expired entries vanish from the index without a reload.
	assert!(cache.get_boosts("old", Mode::History).is_empty());
	assert!(cache.get_boosts("older", Mode::History).is_empty());
	assert!(!cache.get_boosts("fresh", Mode::History).is_empty());

	// And from the durable store.
	let swept_id = recall_domain::usage_id(Mode::History, "old", "https://old.example.com");

	assert!(recall_storage::usage::fetch(&db, &swept_id).await.expect("Fetch failed.").is_none());

	let kept_id = recall_domain::usage_id(Mode::History, "fresh", "https://fresh.example.com");

	assert!(recall_storage::usage::fetch(&db, &kept_id).await.expect("Fetch failed.").is_some());

	test_db.cleanup().expect("Failed to clean up the test directory.");
}

#[tokio::test]
async fn stats_break_down_by_mode() {
	let (test_db, db) = super::test_db().await;
	let cache = AdaptiveCache::new(db);

	cache.initialize().await.expect("Failed to initialize the cache.");
	cache.record("a", "https://a.example.com", Mode::Tabs).await.expect("Record failed.");
	cache.record("a", "https://b.example.com", Mode::Tabs).await.expect("Record failed.");
	cache.record("b", "https://a.example.com", Mode::History).await.expect("Record failed.");

	let stats = cache.get_stats();

	assert_eq!(stats.total_entries, 3);
	assert_eq!(stats.unique_inputs, 2);
	assert_eq!(stats.mode_breakdown.tabs, 2);
	assert_eq!(stats.mode_breakdown.history, 1);
	assert_eq!(stats.mode_breakdown.bookmarks, 0);

	test_db.cleanup().expect("Failed to clean up the test directory.");
}
