//! Configuration access port trait.

/// Sectioned key/value configuration.
///
/// `get_bool` falls back to `default` when the key is absent or is not a
/// boolean; use `get_string` when a bad value must be reported.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
