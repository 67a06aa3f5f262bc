use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::crypto::{parse_felt, FieldElement};
use crate::error::{AccountError, Result};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AccountConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AccountSection {
    /// Hex address of the deployed account contract.
    pub address: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5050".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            account: AccountSection::default(),
            log_level: default_log_level(),
        }
    }
}

impl AccountConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AccountError::Config(format!("Error parsing config: {}", e)))
    }

    /// Reads the config at `path`. `None` when the file does not exist; a file
    /// that exists but cannot be read or parsed is an error.
    pub fn load(path: &str) -> Result<Option<Self>> {
        if !std::path::Path::new(path).exists() {
            return Ok(None);
        }
        let s = std::fs::read_to_string(path)
            .map_err(|e| AccountError::Config(format!("Error reading config '{}': {}", path, e)))?;
        let config = Self::from_toml_str(&s)?;
        info!("Config loaded from {}", path);
        Ok(Some(config))
    }

    /// Like [`AccountConfig::load`], falling back to defaults for a missing file.
    pub fn load_or_default(path: &str) -> Result<Self> {
        Ok(Self::load(path)?.unwrap_or_else(|| {
            warn!("Config file not found at '{}'. Using defaults.", path);
            Self::default()
        }))
    }

    /// The configured account address, parsed.
    pub fn account_address(&self) -> Result<FieldElement> {
        let address = self
            .account
            .address
            .as_deref()
            .ok_or_else(|| AccountError::Config("account.address is not set".to_string()))?;
        parse_felt(address).map_err(|e| AccountError::Config(format!("account.address: {}", e)))
    }
}
