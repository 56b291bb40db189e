use crate::{Result, db::Db, models::SettingsRow};

pub async fn fetch(db: &Db, store: &str) -> Result<Option<SettingsRow>> {
	let row = sqlx::query_as::<_, SettingsRow>(
		"\
SELECT store, version, data, last_saved_from
FROM settings
WHERE store = ?",
	)
	.bind(store)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn put(db: &Db, row: &SettingsRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO settings (store, version, data, last_saved_from)
VALUES (?, ?, ?, ?)
ON CONFLICT(store) DO UPDATE SET
	version = excluded.version,
	data = excluded.data,
	last_saved_from = excluded.last_saved_from",
	)
	.bind(&row.store)
	.bind(row.version)
	.bind(&row.data)
	.bind(&row.last_saved_from)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn remove(db: &Db, store: &str) -> Result<()> {
	sqlx::query("DELETE FROM settings WHERE store = ?").bind(store).execute(&db.pool).await?;

	Ok(())
}
