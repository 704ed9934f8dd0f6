use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;

const CONFIG_FILE: &str = "ecomed";
const ENV_PREFIX: &str = "ECOMED";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
}

impl Settings {
    /// Defaults, then `ecomed.toml` if present, then `ECOMED_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_prefix(ENV_PREFIX)
    }

    fn load_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(prefix))
            .build()?
            .try_deserialize()
    }
}
