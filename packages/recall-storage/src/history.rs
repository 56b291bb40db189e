use sqlx::SqliteConnection;

use crate::{Result, db::Db, models::HistoryRecord};

pub async fn fetch(db: &Db, url: &str) -> Result<Option<HistoryRecord>> {
	let record = sqlx::query_as::<_, HistoryRecord>(
		"\
SELECT url, title, last_visit_time, visit_count
FROM history
WHERE url = ?",
	)
	.bind(url)
	.fetch_optional(&db.pool)
	.await?;

	Ok(record)
}

pub async fn fetch_tx(conn: &mut SqliteConnection, url: &str) -> Result<Option<HistoryRecord>> {
	let record = sqlx::query_as::<_, HistoryRecord>(
		"\
SELECT url, title, last_visit_time, visit_count
FROM history
WHERE url = ?",
	)
	.bind(url)
	.fetch_optional(conn)
	.await?;

	Ok(record)
}

pub async fn put_tx(conn: &mut SqliteConnection, record: &HistoryRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO history (url, title, last_visit_time, visit_count)
VALUES (?, ?, ?, ?)
ON CONFLICT(url) DO UPDATE SET
	title = excluded.title,
	last_visit_time = excluded.last_visit_time,
	visit_count = excluded.visit_count",
	)
	.bind(&record.url)
	.bind(&record.title)
	.bind(record.last_visit_time)
	.bind(record.visit_count)
	.execute(conn)
	.await?;

	Ok(())
}

/// Newest first over the time index, bounded; never a full scan.
pub async fn recent(db: &Db, limit: i64) -> Result<Vec<HistoryRecord>> {
	let records = sqlx::query_as::<_, HistoryRecord>(
		"\
SELECT url, title, last_visit_time, visit_count
FROM history
ORDER BY last_visit_time DESC
LIMIT ?",
	)
	.bind(limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(records)
}

pub async fn delete(db: &Db, url: &str) -> Result<()> {
	sqlx::query("DELETE FROM history WHERE url = ?").bind(url).execute(&db.pool).await?;

	Ok(())
}

pub async fn clear(db: &Db) -> Result<()> {
	sqlx::query("DELETE FROM history").execute(&db.pool).await?;

	Ok(())
}

pub async fn count(db: &Db) -> Result<i64> {
	let (count,): (i64,) =
		sqlx::query_as("SELECT COUNT(*) FROM history").fetch_one(&db.pool).await?;

	Ok(count)
}
