//! Durable marker flags keyed by name, used for one-time initialization state.

use crate::{Result, db::Db};

pub async fn get_flag(db: &Db, name: &str) -> Result<bool> {
	let value: Option<(String,)> = sqlx::query_as("SELECT value FROM meta WHERE name = ?")
		.bind(name)
		.fetch_optional(&db.pool)
		.await?;

	Ok(value.is_some_and(|(value,)| value == "true"))
}

pub async fn set_flag(db: &Db, name: &str, value: bool) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO meta (name, value)
VALUES (?, ?)
ON CONFLICT(name) DO UPDATE SET value = excluded.value",
	)
	.bind(name)
	.bind(if value { "true" } else { "false" })
	.execute(&db.pool)
	.await?;

	Ok(())
}
