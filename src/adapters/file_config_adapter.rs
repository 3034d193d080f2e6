//! INI file configuration adapter.

use crate::domain::error::ZonetraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ZonetraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ZonetraderError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ZonetraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ZonetraderError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn typed<T>(
        &self,
        section: &str,
        key: &str,
        parsed: Result<Option<T>, String>,
    ) -> Result<Option<T>, ZonetraderError> {
        parsed.map_err(|_| {
            let raw = self.config.get(section, key).unwrap_or_default();
            ZonetraderError::invalid(section, key, format!("cannot parse '{}'", raw))
        })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, ZonetraderError> {
        self.typed(section, key, self.config.getint(section, key))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, ZonetraderError> {
        self.typed(section, key, self.config.getfloat(section, key))
    }
}
