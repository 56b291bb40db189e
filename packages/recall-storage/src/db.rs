use std::{fs, time::Duration};

use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::{Result, schema};

/// Handle on the shared SQLite file backing every durable store of the layer.
#[derive(Clone)]
pub struct Db {
	pub pool: SqlitePool,
}
impl Db {
	pub async fn connect(cfg: &recall_config::Storage) -> Result<Self> {
		if let Some(parent) = cfg.db_path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent).map_err(|err| {
				crate::Error::InvalidArgument(format!(
					"Failed to create storage directory {parent:?}: {err}."
				))
			})?;
		}

		// WAL keeps concurrent readers from other contexts unblocked while one
		// context writes; busy_timeout covers short cross-context write overlap.
		let options = SqliteConnectOptions::new()
			.filename(&cfg.db_path)
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal)
			.synchronous(SqliteSynchronous::Normal)
			.busy_timeout(Duration::from_secs(5))
			.foreign_keys(true);
		let pool = SqlitePoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.connect_with(options)
			.await?;

		tracing::debug!(path = %cfg.db_path.display(), "Opened the storage database.");

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		// One transaction so a half-created schema never becomes visible.
		let mut tx = self.pool.begin().await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}
}
