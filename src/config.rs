use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Default location of the Our World in Data feed.
pub const OWID_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Process-wide configuration: defaults, then `config.toml`, then `COVID_DASH_*` env vars.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::figment()
        .extract()
        .unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub basic: BasicConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub data_url: Url,
    /// Rows committed per transaction.
    pub batch_size: usize,
    pub progress_every: usize,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("COVID_DASH_").split("__"))
    }
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:covid.sqlite".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            data_url: Url::parse(OWID_DATA_URL).expect("static feed URL is valid"),
            batch_size: 500,
            progress_every: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COVID_DASH_BASIC__DATABASE_URL", "sqlite::memory:");
            jail.set_env("COVID_DASH_IMPORT__BATCH_SIZE", "42");
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.database_url, "sqlite::memory:");
            assert_eq!(cfg.import.batch_size, 42);
            assert_eq!(cfg.import.progress_every, 100);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [basic]
                listen_addr = "127.0.0.1:9000"
                "#,
            )?;
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.listen_addr, "127.0.0.1:9000");
            assert_eq!(cfg.basic.loglevel, "info");
            assert_eq!(cfg.import.data_url.as_str(), OWID_DATA_URL);
            Ok(())
        });
    }
}
