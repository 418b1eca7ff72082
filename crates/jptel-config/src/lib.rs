use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "jptel";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_MAX_ENTRIES: usize = 100_000;
pub const MAX_ENTRIES_LIMIT: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub json: bool,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub fail_fast: bool,
    pub skip_blank: bool,
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            json: false,
            batch: BatchConfig {
                fail_fast: false,
                skip_blank: true,
                max_entries: DEFAULT_MAX_ENTRIES,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid batch.max_entries value: {0}")]
    InvalidMaxEntries(i64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    json: Option<bool>,
    batch: Option<BatchFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchFile {
    fail_fast: Option<bool>,
    skip_blank: Option<bool>,
    max_entries: Option<i64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(json) = parsed.json {
        config.json = json;
    }

    if let Some(batch) = parsed.batch {
        if let Some(fail_fast) = batch.fail_fast {
            config.batch.fail_fast = fail_fast;
        }
        if let Some(skip_blank) = batch.skip_blank {
            config.batch.skip_blank = skip_blank;
        }
        if let Some(max_entries) = batch.max_entries {
            config.batch.max_entries = validate_max_entries(max_entries)?;
        }
    }

    Ok(config)
}

fn validate_max_entries(value: i64) -> Result<usize> {
    match usize::try_from(value) {
        Ok(entries) if (1..=MAX_ENTRIES_LIMIT).contains(&entries) => Ok(entries),
        _ => Err(ConfigError::InvalidMaxEntries(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        load, load_at_path, merge_config, resolve_config_path, AppConfig, BatchFile, ConfigError,
        ConfigFile, DEFAULT_MAX_ENTRIES,
    };
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn merge_config_applies_values() {
        let parsed = ConfigFile {
            json: Some(true),
            batch: Some(BatchFile {
                fail_fast: Some(true),
                skip_blank: Some(false),
                max_entries: Some(50),
            }),
        };
        let merged = merge_config(parsed).expect("merge");
        assert!(merged.json);
        assert!(merged.batch.fail_fast);
        assert!(!merged.batch.skip_blank);
        assert_eq!(merged.batch.max_entries, 50);
    }

    #[test]
    fn merge_config_keeps_defaults_for_missing_values() {
        let merged = merge_config(ConfigFile::default()).expect("merge");
        assert_eq!(merged, AppConfig::default());
        assert_eq!(merged.batch.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn merge_config_rejects_out_of_range_max_entries() {
        for value in [0, -5, 2_000_000] {
            let parsed = ConfigFile {
                json: None,
                batch: Some(BatchFile {
                    max_entries: Some(value),
                    ..BatchFile::default()
                }),
            };
            let err = merge_config(parsed).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMaxEntries(v) if v == value));
        }
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_skips_missing_optional_file() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        assert!(load_at_path(&missing, false).expect("load").is_none());
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "json = true\n[batch]\nfail_fast = true\n").expect("write config");

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert!(config.json);
        assert!(config.batch.fail_fast);
        assert!(config.batch.skip_blank);
    }

    #[test]
    fn load_at_path_rejects_unknown_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "region = \"jp\"\n").expect("write config");

        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_with_explicit_path_uses_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("custom.toml");
        fs::write(&path, "[batch]\nmax_entries = 10\n").expect("write config");

        let config = load(Some(path)).expect("load");
        assert_eq!(config.batch.max_entries, 10);
    }

    #[test]
    fn resolve_config_path_rejects_empty_custom_path() {
        let err = resolve_config_path(Some(PathBuf::new())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigPath(_)));
    }
}
