//! Server configuration from the environment.

use study_core::{DueSelector, Sm2};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from environment variables (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Cap on cards per session. Unset means no cap.
    pub reviews_per_day: Option<usize>,
    /// SM-2 constants, overridable through `SM2_*` variables.
    pub scheduler: Sm2,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            daily_reset_hour: 0,
            reviews_per_day: None,
            scheduler: Sm2::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Missing variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let daily_reset_hour = parse(&lookup, "DAILY_RESET_HOUR")?.unwrap_or(defaults.daily_reset_hour);
        if daily_reset_hour > 23 {
            return Err(ConfigError::Invalid {
                name: "DAILY_RESET_HOUR",
                value: daily_reset_hour.to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT")?.unwrap_or(defaults.port),
            daily_reset_hour,
            reviews_per_day: parse(&lookup, "REVIEWS_PER_DAY")?,
            scheduler: scheduler_from_lookup(&lookup, defaults.scheduler)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn selector(&self) -> DueSelector {
        DueSelector::new(self.daily_reset_hour, self.reviews_per_day)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn scheduler_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
    defaults: Sm2,
) -> Result<Sm2, ConfigError> {
    Ok(Sm2 {
        initial_ease: positive(lookup, "SM2_INITIAL_EASE")?.unwrap_or(defaults.initial_ease),
        minimum_ease: positive(lookup, "SM2_MINIMUM_EASE")?.unwrap_or(defaults.minimum_ease),
        hard_multiplier: positive(lookup, "SM2_HARD_MULTIPLIER")?
            .unwrap_or(defaults.hard_multiplier),
        easy_bonus: positive(lookup, "SM2_EASY_BONUS")?.unwrap_or(defaults.easy_bonus),
        first_interval: positive(lookup, "SM2_FIRST_INTERVAL")?.unwrap_or(defaults.first_interval),
        second_interval: positive(lookup, "SM2_SECOND_INTERVAL")?
            .unwrap_or(defaults.second_interval),
        again_interval: positive(lookup, "SM2_AGAIN_INTERVAL")?.unwrap_or(defaults.again_interval),
        maximum_interval: positive(lookup, "SM2_MAXIMUM_INTERVAL")?
            .unwrap_or(defaults.maximum_interval),
    })
}

/// A finite number above zero.
fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<f64>, ConfigError> {
    match parse::<f64>(lookup, name)? {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
        value => Ok(value),
    }
}
