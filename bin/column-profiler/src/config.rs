use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context as _, Error};
use figment::{
    providers::{Env, Format as _, Yaml},
    Figment,
};
use serde::Deserialize;

/// Prefix of the environment variables that override file settings.
const ENV_PREFIX: &str = "COLUMN_PROFILER_";

const fn default_write_domain_files() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path to the catalog snapshot.
    ///
    /// Files with a `.json` extension are read as JSON, anything else as YAML.
    pub catalog_path: PathBuf,

    /// Directory that distribution and domain files are written to.
    ///
    /// Created if it does not exist.
    pub output_dir: PathBuf,

    /// Whether to write domain files for fully enumerated columns.
    #[serde(default = "default_write_domain_files")]
    pub write_domain_files: bool,

    /// Type name overrides, keyed by qualified column name (`schema.table.column`).
    ///
    /// Useful when the catalog's declared type is not the best domain for a column, such as a `CHAR(1)` flag column
    /// whose values should be treated as strings.
    #[serde(default)]
    pub type_overrides: HashMap<String, String>,
}

impl Config {
    /// Attempts to load a `Config` from the given file path, layered under `COLUMN_PROFILER_` environment variables.
    ///
    /// # Errors
    ///
    /// If the file does not exist, or the merged configuration cannot be deserialized, an error is returned.
    pub fn try_from_file<P>(config_path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let config_path = config_path.as_ref();
        ensure!(
            config_path.is_file(),
            "Configuration file '{}' does not exist.",
            config_path.display()
        );

        Figment::new()
            .merge(Yaml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Failed to parse configuration file.")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn loads_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "catalog_path: /data/catalog.yaml\noutput_dir: /data/out\n").unwrap();

        let config = Config::try_from_file(&path).unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/data/catalog.yaml"));
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert!(config.write_domain_files);
        assert!(config.type_overrides.is_empty());
    }

    #[test]
    fn loads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
catalog_path: catalog.json
output_dir: out
write_domain_files: false
type_overrides:
  SALES.ORDERS.FLAG: VARCHAR
"#,
        )
        .unwrap();

        let config = Config::try_from_file(&path).unwrap();
        assert!(!config.write_domain_files);
        assert_eq!(
            config.type_overrides.get("SALES.ORDERS.FLAG").map(String::as_str),
            Some("VARCHAR")
        );
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::try_from_file(dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn missing_required_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "catalog_path: catalog.yaml\n").unwrap();

        assert!(Config::try_from_file(&path).is_err());
    }
}
