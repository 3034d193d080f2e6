//! Configuration access port trait.
//!
//! Typed getters return `Ok(None)` for an absent key and `ConfigInvalid` for
//! a present value that does not parse; they never substitute a default.

use crate::domain::error::ZonetraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, ZonetraderError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, ZonetraderError>;
}
