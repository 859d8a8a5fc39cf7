//! Configuration access port trait.
//!
//! Absent keys fall back to the supplied default; present but unparseable
//! values are reported as [`ConfluenceError::ConfigInvalid`].

use crate::domain::error::ConfluenceError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, ConfluenceError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, ConfluenceError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfluenceError>;

    /// Like [`get_int`](Self::get_int) but rejects negative values.
    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, ConfluenceError> {
        let value = self.get_int(section, key, default as i64)?;
        usize::try_from(value)
            .map_err(|_| ConfluenceError::invalid(section, key, format!("{key} must be non-negative")))
    }
}
