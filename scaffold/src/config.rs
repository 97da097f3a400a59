use std::{
	fs, io,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = ".scaffold";

/// Settings remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
	pub connection_string: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schema: Option<String>,
}

/// Reads and writes the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
	path: PathBuf,
}

impl ConfigStore {
	/// The store at `<home>/.scaffold`, or `None` when there is no home directory.
	pub fn default_location() -> Option<Self> {
		dirs::home_dir().map(|home| Self::at(home.join(CONFIG_FILE)))
	}

	pub fn at(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the saved configuration. A missing file yields `Ok(None)`.
	pub fn load(&self) -> io::Result<Option<Configuration>> {
		let text = match fs::read_to_string(&self.path) {
			Ok(text) => text,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e),
		};

		let config = serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
		Ok(Some(config))
	}

	pub fn save(&self, config: &Configuration) -> io::Result<()> {
		let text = serde_json::to_string_pretty(config).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
		fs::write(&self.path, text)?;
		log::info!("Saved configuration to {}", self.path.display());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_file_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let store = ConfigStore::at(dir.path().join(CONFIG_FILE));

		assert_eq!(store.load()?, None);
		Ok(())
	}

	#[test]
	fn test_save_then_load() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let store = ConfigStore::at(dir.path().join(CONFIG_FILE));
		let config = Configuration {
			connection_string: "postgres://localhost/shop".to_string(),
			schema: Some("sales".to_string()),
		};

		store.save(&config)?;
		assert_eq!(store.load()?, Some(config));
		Ok(())
	}

	#[test]
	fn test_schema_is_optional_on_disk() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let store = ConfigStore::at(dir.path().join(CONFIG_FILE));
		fs::write(store.path(), r#"{ "connection_string": "sqlite:shop.db" }"#)?;

		let loaded = store.load()?.ok_or("expected a configuration")?;
		assert_eq!(loaded.connection_string, "sqlite:shop.db");
		assert_eq!(loaded.schema, None);
		Ok(())
	}

	#[test]
	fn test_corrupt_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
		let dir = tempfile::tempdir()?;
		let store = ConfigStore::at(dir.path().join(CONFIG_FILE));
		fs::write(store.path(), "not json")?;

		let err = store.load().unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidData);
		Ok(())
	}
}
