pub mod resolver;
pub mod store;

pub use store::{ConfigOptions, ConfigStore};

use crate::Result;
use once_cell::sync::OnceCell;

/// Process-wide configuration, loaded on first use from [`ConfigOptions::from_env`].
///
/// A load failure is returned to every caller; no test can proceed without configuration.
pub fn global() -> Result<&'static ConfigStore> {
    static GLOBAL: OnceCell<ConfigStore> = OnceCell::new();
    GLOBAL.get_or_try_init(|| ConfigStore::load(ConfigOptions::from_env()))
}
