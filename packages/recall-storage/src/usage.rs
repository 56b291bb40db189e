use crate::{Result, db::Db, models::UsageRecord};

pub async fn fetch(db: &Db, id: &str) -> Result<Option<UsageRecord>> {
	let record = sqlx::query_as::<_, UsageRecord>(
		"\
SELECT id, mode, input, url, use_count, last_used
FROM usage_records
WHERE id = ?",
	)
	.bind(id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(record)
}

pub async fn put(db: &Db, record: &UsageRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO usage_records (id, mode, input, url, use_count, last_used)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
	use_count = excluded.use_count,
	last_used = excluded.last_used",
	)
	.bind(&record.id)
	.bind(&record.mode)
	.bind(&record.input)
	.bind(&record.url)
	.bind(record.use_count)
	.bind(record.last_used)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Records one selection in a single atomic statement: inserts the record at
/// one use, or bumps the stored count in place. Concurrent callers each land
/// their increment; a fetch-then-put pair would let one overwrite the other.
pub async fn bump(db: &Db, record: &UsageRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO usage_records (id, mode, input, url, use_count, last_used)
VALUES (?, ?, ?, ?, 1, ?)
ON CONFLICT(id) DO UPDATE SET
	use_count = usage_records.use_count + 1,
	last_used = excluded.last_used",
	)
	.bind(&record.id)
	.bind(&record.mode)
	.bind(&record.input)
	.bind(&record.url)
	.bind(record.last_used)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Full scan, used only by the cache rebuild at initialization.
pub async fn all(db: &Db) -> Result<Vec<UsageRecord>> {
	let records = sqlx::query_as::<_, UsageRecord>(
		"\
SELECT id, mode, input, url, use_count, last_used
FROM usage_records",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(records)
}

/// One bounded page of expired records, newest of the expired first, walked
/// repeatedly by the age sweep until it comes back empty.
pub async fn stale_batch(db: &Db, cutoff: i64, limit: i64) -> Result<Vec<UsageRecord>> {
	let records = sqlx::query_as::<_, UsageRecord>(
		"\
SELECT id, mode, input, url, use_count, last_used
FROM usage_records
WHERE last_used <= ?
ORDER BY last_used DESC
LIMIT ?",
	)
	.bind(cutoff)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(records)
}

pub async fn delete(db: &Db, id: &str) -> Result<()> {
	sqlx::query("DELETE FROM usage_records WHERE id = ?").bind(id).execute(&db.pool).await?;

	Ok(())
}

pub async fn delete_by_url(db: &Db, url: &str) -> Result<u64> {
	let result =
		sqlx::query("DELETE FROM usage_records WHERE url = ?").bind(url).execute(&db.pool).await?;

	Ok(result.rows_affected())
}

pub async fn clear(db: &Db) -> Result<()> {
	sqlx::query("DELETE FROM usage_records").execute(&db.pool).await?;

	Ok(())
}

pub async fn count(db: &Db) -> Result<i64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM usage_records").fetch_one(&db.pool).await?;

	Ok(count)
}
