//! Named async mutexes, modeled on the host's named-lock capability: a task
//! submitted under a name runs with exclusivity against every other task
//! submitted under the same name.

use std::{
	collections::HashMap,
	future::Future,
	sync::{Arc, Mutex as StdMutex},
};

use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct NamedLocks {
	inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}
impl NamedLocks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs `task` while holding the mutex registered under `name`. Locks are
	/// created on first use and kept for the life of the registry, so a name
	/// always maps to the same mutex.
	pub async fn request<F, Fut, T>(&self, name: &str, task: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let lock = {
			let mut registry = self.inner.lock().unwrap_or_else(|err| err.into_inner());

			registry.entry(name.to_string()).or_default().clone()
		};
		let _guard = lock.lock().await;

		task().await
	}
}
