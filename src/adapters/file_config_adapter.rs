//! INI file configuration adapter.

use crate::domain::error::ConfluenceError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfluenceError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| ConfluenceError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ConfluenceError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ConfluenceError::ConfigParse {
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

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, ConfluenceError> {
        self.config
            .getint(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|e| ConfluenceError::invalid(section, key, e))
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ConfluenceError> {
        self.config
            .getfloat(section, key)
            .map(|v| v.unwrap_or(default))
            .map_err(|e| ConfluenceError::invalid(section, key, e))
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfluenceError> {
        match self.config.get(section, key) {
            None => Ok(default),
            Some(v) => Self::parse_bool(&v).ok_or_else(|| {
                ConfluenceError::invalid(section, key, format!("{v:?} is not a boolean"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
path = /data/eurusd_m1.csv

[indicators]
window = 14
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("/data/eurusd_m1.csv".to_string())
        );
        assert_eq!(adapter.get_int("indicators", "window", 0).unwrap(), 14);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[entry]\nmin_atr = 0.0003\n").unwrap();
        assert_eq!(adapter.get_string("entry", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[indicators]\n").unwrap();
        assert_eq!(adapter.get_int("indicators", "missing", 42).unwrap(), 42);
    }

    #[test]
    fn get_int_rejects_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[indicators]\nwindow = abc\n").unwrap();
        let err = adapter.get_int("indicators", "window", 14).unwrap_err();
        assert!(matches!(err, ConfluenceError::ConfigInvalid { ref key, .. } if key == "window"));
    }

    #[test]
    fn get_usize_rejects_negative() {
        let adapter = FileConfigAdapter::from_string("[data]\nskip_rows = -3\n").unwrap();
        assert!(adapter.get_usize("data", "skip_rows", 0).is_err());
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[exit]\nfee = 0.0001\n").unwrap();
        assert_eq!(adapter.get_double("exit", "fee", 0.0).unwrap(), 0.0001);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[exit]\n").unwrap();
        assert_eq!(adapter.get_double("exit", "missing", 99.9).unwrap(), 99.9);
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[exit]\nfee = cheap\n").unwrap();
        assert!(adapter.get_double("exit", "fee", 0.0).is_err());
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[data]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("data", "a", false).unwrap());
        assert!(adapter.get_bool("data", "b", false).unwrap());
        assert!(adapter.get_bool("data", "c", false).unwrap());
        assert!(!adapter.get_bool("data", "d", true).unwrap());
        assert!(!adapter.get_bool("data", "e", true).unwrap());
        assert!(!adapter.get_bool("data", "f", true).unwrap());
    }

    #[test]
    fn get_bool_default_and_garbage() {
        let adapter = FileConfigAdapter::from_string("[data]\nhas_headers = maybe\n").unwrap();
        assert!(adapter.get_bool("data", "missing", true).unwrap());
        assert!(adapter.get_bool("data", "has_headers", false).is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\ntrades_out = /tmp/trades.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "trades_out"),
            Some("/tmp/trades.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(ConfluenceError::ConfigParse { .. })));
    }
}
