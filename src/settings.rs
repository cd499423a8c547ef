use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use serde::Deserialize;

use crate::pipeline::normalize::{
    ExchangeTable, DEFAULT_EXCHANGE_RATE, FOREIGN_SYMBOL, REFERENCE_SYMBOL,
};

const LISTING_URL: &str = "https://www.livelo.com.br/juntar-pontos/todos-os-parceiros";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0 Safari/537.36";
const CACHE_TTL_SECS: i64 = 600;

/// Runtime settings: built-in defaults, then `livelo.toml`, then `LIVELO_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub listing_url: String,
    pub user_agent: String,
    pub reference_symbol: String,
    pub foreign_symbol: String,
    pub exchange_rate: f64,
    pub cache_ttl_secs: u64,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("listing_url", LISTING_URL)?
        .set_default("user_agent", USER_AGENT)?
        .set_default("reference_symbol", REFERENCE_SYMBOL)?
        .set_default("foreign_symbol", FOREIGN_SYMBOL)?
        .set_default("exchange_rate", DEFAULT_EXCHANGE_RATE)?
        .set_default("cache_ttl_secs", CACHE_TTL_SECS)
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = defaults()?
            .add_source(config::File::with_name("livelo").required(false))
            .add_source(config::Environment::with_prefix("LIVELO"))
            .build()
            .context("Failed to read settings")?;
        settings
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn exchange_table(&self) -> ExchangeTable {
        ExchangeTable {
            reference_symbol: self.reference_symbol.clone(),
            foreign_symbol: self.foreign_symbol.clone(),
            rate: self.exchange_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings: Settings = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.listing_url, LISTING_URL);
        assert_eq!(settings.cache_ttl_secs, 600);
        assert_eq!(settings.exchange_table(), ExchangeTable::default());
    }

    #[test]
    fn overrides_replace_defaults() {
        let settings: Settings = defaults()
            .unwrap()
            .set_override("exchange_rate", 6.1)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.exchange_table().rate, 6.1);
        assert_eq!(settings.exchange_table().normalize("U$", 10.0), 61.0);
    }
}
