//! INI file configuration adapter.
//!
//! Values are trimmed and a key set to an empty value reads as absent.
//! Numbers that fail to parse fall back to the caller's default with a
//! warning naming the key.

use crate::domain::error::AlgoTraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use log::warn;
use std::path::Path;
use std::str::FromStr;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AlgoTraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| AlgoTraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, AlgoTraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| AlgoTraderError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        let raw = self.config.get(section, key)?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn parsed<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        match self.value(section, key) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("[{section}] {key} = {raw:?} is not a number, using default");
                default
            }),
            None => default,
        }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.value(section, key) {
            Some(raw) => Self::parse_bool(&raw).unwrap_or_else(|| {
                warn!("[{section}] {key} = {raw:?} is not a boolean, using default");
                default
            }),
            None => default,
        }
    }
}
