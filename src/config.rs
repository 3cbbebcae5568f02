use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("salon opens at {open}:00 but closes at {close}:00")]
    WorkingHours { open: u8, close: u8 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub open_hour: u8,
    pub close_hour: u8,
    pub slot_minutes: u16,
}

impl Config {
    /// Читает `.env` (если есть) и переменные окружения.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let config = Config {
            database_url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            open_hour: parse_or("SALON_OPEN_HOUR", 10)?,
            close_hour: parse_or("SALON_CLOSE_HOUR", 20)?,
            slot_minutes: parse_or("SLOT_MINUTES", 60)?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.open_hour >= self.close_hour || self.close_hour > 24 {
            return Err(ConfigError::WorkingHours { open: self.open_hour, close: self.close_hour });
        }
        if self.slot_minutes == 0 {
            return Err(ConfigError::Invalid { name: "SLOT_MINUTES", value: "0".to_string() });
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
