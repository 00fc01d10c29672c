use std::fs;
use std::path::{Path, PathBuf};

use codelab_notebook::ConvertOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "codelab.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read configuration {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration {}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Refers to a `codelab.yml` file. Every key is optional:
///
/// ```yaml
/// base_url_prefix: https://raw.githubusercontent.com/org/repo/main/labs/
/// kernel:
///   display_name: Streamlit Notebook
///   name: streamlit
/// unterminated_fence: reject
/// query_warehouse: COMPUTE_WH
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub convert: ConvertOptions,
    #[serde(default)]
    pub query_warehouse: Option<String>,
}

impl Config {
    pub fn parse(input: &str) -> Result<Self, serde_yaml::Error> {
        if input.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(input)
    }

    /// Loads an explicit configuration file, or `codelab.yml` from `dir` when it
    /// exists. Without either the defaults are used.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = dir.join(DEFAULT_CONFIG_FILE);
                if !default_path.is_file() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let input = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Config::parse(&input).map_err(|source| ConfigError::Yaml { path, source })
    }
}

#[cfg(test)]
mod tests {
    use codelab_notebook::{KernelSpec, UnterminatedFence, DEFAULT_BASE_URL_PREFIX};

    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
        assert_eq!(
            Config::default().convert.base_url_prefix,
            DEFAULT_BASE_URL_PREFIX
        );
    }

    #[test]
    fn parse_full_config() {
        let input = r#"
base_url_prefix: https://example.com/labs/
kernel:
  display_name: Python 3
  name: python3
unterminated_fence: reject
query_warehouse: COMPUTE_WH
"#;
        let config = Config::parse(input).unwrap();
        assert_eq!(config.convert.base_url_prefix, "https://example.com/labs/");
        assert_eq!(
            config.convert.kernel,
            KernelSpec {
                display_name: "Python 3".to_string(),
                name: "python3".to_string()
            }
        );
        assert_eq!(config.convert.unterminated_fence, UnterminatedFence::Reject);
        assert_eq!(config.query_warehouse.as_deref(), Some("COMPUTE_WH"));
    }

    #[test]
    fn load_prefers_explicit_then_directory_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(None, dir.path()).unwrap(), Config::default());

        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "query_warehouse: WH\n").unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.query_warehouse.as_deref(), Some("WH"));

        let explicit = dir.path().join("other.yml");
        fs::write(&explicit, "unterminated_fence: reject\n").unwrap();
        let config = Config::load(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.convert.unterminated_fence, UnterminatedFence::Reject);
        assert_eq!(config.query_warehouse, None);
    }

    #[test]
    fn load_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        assert!(matches!(
            Config::load(Some(&missing), dir.path()),
            Err(ConfigError::Io { .. })
        ));

        let invalid = dir.path().join("bad.yml");
        fs::write(&invalid, "unterminated_fence: sometimes\n").unwrap();
        assert!(matches!(
            Config::load(Some(&invalid), dir.path()),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
