use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub import: Import,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub db_path: PathBuf,
	pub pool_max_conns: u32,
}

/// Tuning for the one-time import from the host's native history provider.
#[derive(Clone, Debug, Deserialize)]
pub struct Import {
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_max_pages")]
	pub max_pages: u32,
}

impl Default for Import {
	fn default() -> Self {
		Self { page_size: default_page_size(), max_pages: default_max_pages() }
	}
}

fn default_page_size() -> u32 {
	1_000
}

fn default_max_pages() -> u32 {
	2
}
