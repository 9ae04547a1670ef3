use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::LogConfig;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "flightlog.toml";

/// Error type for reading flightlog.toml
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse flightlog.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read the config from `path`, or from `flightlog.toml` in the current
/// directory when no path is given. A missing default file means defaults;
/// a missing explicit file is an error.
pub fn read_config(path: Option<&Path>) -> Result<LogConfig, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.exists() {
                return Ok(LogConfig::default());
            }
            default
        }
    };
    let text = fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<LogConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::flight::FlightField;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.search.fields, FlightField::ALL.to_vec());
        assert_eq!(config.limits.aircraft_max_len, 10);
        assert_eq!(config.limits.route_max_len, 64);
        assert_eq!(config.limits.remarks_max_len, 500);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            r#"[search]
fields = ["aircraft"]

[limits]
route_max_len = 12
"#,
        )
        .unwrap();
        assert_eq!(config.search.fields, vec![FlightField::Aircraft]);
        assert_eq!(config.limits.route_max_len, 12);
        assert_eq!(config.limits.aircraft_max_len, 10);
    }

    #[test]
    fn test_unknown_field_name_is_a_parse_error() {
        let err = parse_config("[search]\nfields = [\"pilot\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_read_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();
        let config = read_config(Some(&path)).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let tmp = TempDir::new().unwrap();
        let err = read_config(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
