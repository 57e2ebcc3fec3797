//! Configuration access port trait.
//!
//! Absent keys yield the caller's default. A key that is present but does not
//! parse as the requested type is an error.

use crate::domain::error::TrendswapError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TrendswapError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TrendswapError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, TrendswapError>;

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .unwrap_or_else(|| default.to_string())
    }
}
