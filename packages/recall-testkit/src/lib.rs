mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::Once,
};

use uuid::Uuid;

static TRACING: Once = Once::new();

/// Installs a test subscriber once per process; later calls are no-ops.
pub fn init_tracing() {
	TRACING.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}

/// A throwaway SQLite database under a unique temp directory, removed on
/// `cleanup` or, best effort, on drop.
pub struct TestDatabase {
	dir: PathBuf,
	path: PathBuf,
	cleaned: bool,
}
impl TestDatabase {
	pub fn new() -> Result<Self> {
		let dir = env::temp_dir().join(format!("recall_test_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&dir)?;

		let path = dir.join("recall.sqlite");

		Ok(Self { dir, path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn storage_config(&self) -> recall_config::Storage {
		recall_config::Storage { db_path: self.path.clone(), pool_max_conns: 5 }
	}

	pub fn cleanup(mut self) -> Result<()> {
		fs::remove_dir_all(&self.dir)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}
		if let Err(err) = fs::remove_dir_all(&self.dir) {
			eprintln!("Test database cleanup failed: {err}.");
		}
	}
}
