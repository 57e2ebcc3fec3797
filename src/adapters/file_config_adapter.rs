//! INI file configuration adapter.

use crate::domain::error::TrendswapError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrendswapError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TrendswapError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TrendswapError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TrendswapError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TrendswapError> {
        self.config
            .getint(section, key)
            .map_err(|e| TrendswapError::invalid(section, key, format!("not an integer: {e}")))
            .map(|value| value.unwrap_or(default))
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TrendswapError> {
        self.config
            .getfloat(section, key)
            .map_err(|e| TrendswapError::invalid(section, key, format!("not a number: {e}")))
            .map(|value| value.unwrap_or(default))
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, TrendswapError> {
        match self.config.get(section, key) {
            None => Ok(default),
            Some(raw) => Self::parse_bool(raw.trim()).ok_or_else(|| {
                TrendswapError::invalid(section, key, format!("'{raw}' is not a boolean"))
            }),
        }
    }
}
