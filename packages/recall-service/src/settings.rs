//! Versioned settings store: a single durable `{version, data}` blob per
//! store name, migrated forward through a chain of version-keyed updaters,
//! with every read-modify-write serialized by a named mutex so concurrent
//! contexts cannot lose each other's writes.

use std::{
	collections::{HashMap, HashSet},
	future::Future,
	sync::Mutex,
};

use serde_json::{Map, Value};

use recall_storage::{db::Db, locks::NamedLocks, models::SettingsRow, settings};

use crate::{BoxFuture, Error, Result};

const LOCK_NAME_BASE: &str = "storage://";

type DefaultData = Box<dyn Fn() -> BoxFuture<'static, Result<Value>> + Send + Sync>;
type Validator = Box<dyn Fn(Value) -> BoxFuture<'static, Result<bool>> + Send + Sync>;
type Updater = Box<dyn Fn(Value, u32) -> BoxFuture<'static, Result<(Value, u32)>> + Send + Sync>;

/// A blob the migration path rejected, kept for post-mortem inspection
/// instead of being silently discarded.
#[derive(Clone, Debug)]
pub struct SettingsFailure {
	pub store: String,
	pub reason: &'static str,
	pub version: u32,
	pub data: Value,
}

static FAILED_SETTINGS: Mutex<Option<HashMap<String, SettingsFailure>>> = Mutex::new(None);

/// The last rejected blob for a store name, if any migration has failed in
/// this process.
pub fn failed_settings(store: &str) -> Option<SettingsFailure> {
	FAILED_SETTINGS
		.lock()
		.unwrap_or_else(|err| err.into_inner())
		.as_ref()
		.and_then(|slots| slots.get(store).cloned())
}

fn record_failed_settings(failure: SettingsFailure) {
	FAILED_SETTINGS
		.lock()
		.unwrap_or_else(|err| err.into_inner())
		.get_or_insert_with(HashMap::new)
		.insert(failure.store.clone(), failure);
}

/// Declarative description of one settings store: its identity, target
/// version, default data, validator, and migration chain.
pub struct SettingsOptions {
	name: String,
	version: u32,
	default_data: DefaultData,
	validate: Validator,
	updaters: HashMap<u32, Updater>,
}
impl SettingsOptions {
	pub fn new(name: &str, version: u32) -> Self {
		Self {
			name: name.to_string(),
			version,
			default_data: Box::new(|| Box::pin(async { Ok(Value::Object(Map::new())) })),
			validate: Box::new(|_| Box::pin(async { Ok(true) })),
			updaters: HashMap::new(),
		}
	}

	pub fn default_data<F, Fut>(mut self, producer: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Value>> + Send + 'static,
	{
		self.default_data = Box::new(move || Box::pin(producer()));

		self
	}

	pub fn validate<F, Fut>(mut self, validator: F) -> Self
	where
		F: Fn(Value) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<bool>> + Send + 'static,
	{
		self.validate = Box::new(move |data| Box::pin(validator(data)));

		self
	}

	/// Registers the updater that migrates data stored at `from_version`.
	/// Each updater returns the new data together with the version it
	/// produced, which selects the next updater in the chain.
	pub fn updater<F, Fut>(mut self, from_version: u32, updater: F) -> Self
	where
		F: Fn(Value, u32) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(Value, u32)>> + Send + 'static,
	{
		self.updaters.insert(from_version, Box::new(move |data, version| {
			Box::pin(updater(data, version))
		}));

		self
	}
}

pub struct SettingsStore {
	db: Db,
	locks: NamedLocks,
	options: SettingsOptions,
	lock_name: String,
	context: String,
}
impl SettingsStore {
	/// Loads, migrates, or default-installs the blob, then returns the store.
	/// Migration failure resets to the default rather than failing the call;
	/// only storage unavailability is an error. Runs without the mutex: no
	/// task can hold the store's lock before the store exists.
	pub async fn initialize(
		db: Db,
		locks: NamedLocks,
		context: &str,
		options: SettingsOptions,
	) -> Result<Self> {
		let lock_name = format!("{LOCK_NAME_BASE}{}", options.name);
		let store = Self { db, locks, options, lock_name, context: context.to_string() };

		match settings::fetch(&store.db, &store.options.name).await? {
			Some(row) => {
				store.migrate(row).await?;
			},
			None => {
				store.reset_unlocked().await?;
			},
		}

		Ok(store)
	}

	pub fn name(&self) -> &str {
		&self.options.name
	}

	pub fn version(&self) -> u32 {
		self.options.version
	}

	/// Current data, read under the store's mutex.
	pub async fn get(&self) -> Result<Value> {
		self.locks.request(&self.lock_name, || async { self.load_data().await }).await
	}

	/// Runs a read task against the current data under the mutex. Nothing is
	/// persisted, whatever the task returns.
	pub async fn get_with<F, Fut, T>(&self, task: F) -> Result<T>
	where
		F: FnOnce(Value) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		self.locks
			.request(&self.lock_name, || async {
				let data = self.load_data().await?;

				task(data).await.map_err(log_task_error)
			})
			.await
	}

	/// Runs a mutate task under the mutex: the task receives the latest
	/// durable data and returns a partial object, which is shallow-merged
	/// over the existing data and persisted as a whole. Returns the merged
	/// result. A failed task persists nothing.
	pub async fn set<F, Fut>(&self, task: F) -> Result<Value>
	where
		F: FnOnce(Value) -> Fut,
		Fut: Future<Output = Result<Value>>,
	{
		self.locks
			.request(&self.lock_name, || async {
				let data = self.load_data().await?;
				let patch = task(data.clone()).await.map_err(log_task_error)?;
				let merged = shallow_merge(data, patch);

				self.persist(merged.clone()).await?;

				Ok(merged)
			})
			.await
	}

	/// Replaces the blob with the default at the current version, under the
	/// same mutex as `get`/`set`.
	pub async fn reset(&self) -> Result<Value> {
		self.locks.request(&self.lock_name, || async { self.reset_unlocked().await }).await
	}

	/// Walks the updater chain from the stored version toward the target,
	/// then validates. A stalled chain (no updater for the current version,
	/// an updater error, or a misconfigured cycle) or a validator rejection
	/// resets the store to its default and retains the rejected blob.
	async fn migrate(&self, row: SettingsRow) -> Result<Value> {
		let mut version = row.version as u32;
		let mut data: Value = serde_json::from_str(&row.data)?;
		let mut visited = HashSet::new();
		let mut updater_failed = false;

		while let Some(updater) = self.options.updaters.get(&version) {
			if !visited.insert(version) {
				// A cycle can only come from a misconfigured chain; treat it
				// like a missing updater instead of looping forever.
				updater_failed = true;

				break;
			}

			match updater(data.clone(), version).await {
				Ok((next_data, next_version)) => {
					data = next_data;
					version = next_version;
				},
				Err(err) => {
					tracing::error!(
						store = %self.options.name,
						from_version = version,
						error = %err,
						"Settings updater failed.",
					);

					updater_failed = true;

					break;
				},
			}
		}

		let reason = if updater_failed || version != self.options.version {
			"failed-update"
		} else if !(self.options.validate)(data.clone()).await.unwrap_or(false) {
			"failed-validation"
		} else {
			self.persist(data.clone()).await?;

			return Ok(data);
		};

		tracing::error!(
			store = %self.options.name,
			failure = reason,
			stored_version = row.version,
			target_version = self.options.version,
			"Settings migration failed; resetting to defaults.",
		);
		record_failed_settings(SettingsFailure {
			store: self.options.name.clone(),
			reason,
			version,
			data,
		});

		self.reset_unlocked().await
	}

	async fn reset_unlocked(&self) -> Result<Value> {
		settings::remove(&self.db, &self.options.name).await?;

		let data = (self.options.default_data)().await?;

		self.persist(data.clone()).await?;

		Ok(data)
	}

	async fn load_data(&self) -> Result<Value> {
		match settings::fetch(&self.db, &self.options.name).await? {
			Some(row) => Ok(serde_json::from_str(&row.data)?),
			// Another context wiped the row out from under us; self-heal with
			// the default rather than handing tasks a hole.
			None => self.reset_unlocked().await,
		}
	}

	async fn persist(&self, data: Value) -> Result<()> {
		settings::put(&self.db, &SettingsRow {
			store: self.options.name.clone(),
			version: self.options.version as i64,
			data: serde_json::to_string(&data)?,
			last_saved_from: self.context.clone(),
		})
		.await?;

		Ok(())
	}
}

fn log_task_error(err: Error) -> Error {
	tracing::error!(error = %err, "Settings task failed.");

	err
}

/// Top-level key merge: tasks return only the keys they changed. Non-object
/// values replace the base wholesale.
fn shallow_merge(base: Value, patch: Value) -> Value {
	match (base, patch) {
		(Value::Object(mut base), Value::Object(patch)) => {
			for (key, value) in patch {
				base.insert(key, value);
			}

			Value::Object(base)
		},
		(_, patch) => patch,
	}
}
