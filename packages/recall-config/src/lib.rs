mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Import, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if !matches!(cfg.service.log_level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
		return Err(Error::Validation {
			message: "service.log_level must be one of trace, debug, info, warn, or error."
				.to_string(),
		});
	}
	if cfg.storage.db_path.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "storage.db_path must be non-empty.".to_string(),
		});
	}
	if cfg.storage.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.import.page_size == 0 {
		return Err(Error::Validation {
			message: "import.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.import.max_pages == 0 {
		return Err(Error::Validation {
			message: "import.max_pages must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_lowercase();
}
