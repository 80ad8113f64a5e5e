use crate::domain::Decimal;
use crate::engine::PipelineOptions;
use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: IpAddr,
    pub roll_quantity_tolerance: Decimal,
    pub merge_multi_leg: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        let options = PipelineOptions::default();
        Config {
            port: 8080,
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            roll_quantity_tolerance: options.roll_quantity_tolerance,
            merge_multi_leg: options.merge_multi_leg,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let bind_addr = env_map
            .get("BIND_ADDR")
            .map(|s| s.as_str())
            .unwrap_or("127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "BIND_ADDR".to_string(),
                    "must be an IPv4 or IPv6 address".to_string(),
                )
            })?;

        let roll_quantity_tolerance = match env_map.get("ROLL_QTY_TOLERANCE") {
            None => Decimal::one(),
            Some(raw) => {
                let invalid = || {
                    ConfigError::InvalidValue(
                        "ROLL_QTY_TOLERANCE".to_string(),
                        "must be a positive decimal".to_string(),
                    )
                };
                let value = Decimal::from_str_canonical(raw.trim()).map_err(|_| invalid())?;
                if !value.is_positive() {
                    return Err(invalid());
                }
                value
            }
        };

        let merge_multi_leg = match env_map
            .get("MERGE_MULTI_LEG")
            .map(|s| s.as_str())
            .unwrap_or("true")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "MERGE_MULTI_LEG".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            bind_addr,
            roll_quantity_tolerance,
            merge_multi_leg,
        })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            roll_quantity_tolerance: self.roll_quantity_tolerance,
            merge_multi_leg: self.merge_multi_leg,
        }
    }
}
