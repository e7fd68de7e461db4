//! Ledger configuration: room catalog seed and refund schedule.
//!
//! Loaded from a JSON file named by `HOTEL_LEDGER_CONFIG`; without it the
//! ledger runs on the built-in two-room catalog and the standard schedule.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hotel_core::{Amount, DomainError};
use hotel_inventory::RoomSpec;

use crate::refund::RefundSchedule;

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "HOTEL_LEDGER_CONFIG";

/// 10^18 smallest units per whole coin (wei per ether).
const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Catalog seed, in room-id order.
    pub rooms: Vec<RoomSpec>,

    #[serde(default)]
    pub refund_schedule: RefundSchedule,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rooms: vec![
                RoomSpec::new("Deluxe Room", Amount::new(WEI_PER_ETHER / 2)),
                RoomSpec::new("Standard Room", Amount::new(WEI_PER_ETHER * 3 / 10)),
            ],
            refund_schedule: RefundSchedule::standard(),
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load from `HOTEL_LEDGER_CONFIG`, or fall back to the default catalog.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "loading ledger config");
                Self::from_path(path)
            }
            Err(_) => {
                tracing::warn!("{CONFIG_PATH_ENV} not set; using default room catalog");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.is_empty() {
            return Err(DomainError::validation("catalog must contain at least one room").into());
        }
        for spec in &self.rooms {
            spec.validate()?;
        }
        Ok(())
    }
}
