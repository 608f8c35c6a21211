// Greeter
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use anyhow::{Context, Result, anyhow};
use greeter_core::{Abi, ContractTarget, DEFAULT_GREETER_ADDRESS, DevChainConfig, parse_address};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const LOG_FILE: &str = "greeter.log";
pub const DEV_CHAIN_FILE: &str = "devchain.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreeterConfig {
    pub data_dir: PathBuf,
    pub contract: ContractConfig,
    pub wallet: WalletConfig,
    pub dev: DevChainConfig,
    pub ui: UiConfig,
    /// File this configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub address: String,
    /// Interface description to use instead of the embedded greeter ABI.
    pub abi_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// In-process development chain
    Dev,
    /// No wallet injected
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub provider: ProviderKind,
    pub account_index: usize,
    /// Keep dev chain state in the data directory between runs.
    pub persist_dev_chain: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub show_debug_info: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("greeter")
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            contract: ContractConfig::default(),
            wallet: WalletConfig::default(),
            dev: DevChainConfig::default(),
            ui: UiConfig::default(),
            source: None,
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_GREETER_ADDRESS.to_string(),
            abi_path: None,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Dev,
            account_index: 0,
            persist_dev_chain: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 250,
            show_debug_info: false,
        }
    }
}

impl GreeterConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut config: Self = toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `--config`, then `$GREETER_CONFIG`, then `config.toml` in the default
    /// data directory, then built-in defaults. The data directory is taken
    /// from `--data-dir`, then `$GREETER_DATA_DIR`, then the configuration.
    pub fn resolve_config(cli_config: Option<PathBuf>, cli_data_dir: Option<PathBuf>) -> Result<Self> {
        let default_file = default_data_dir().join(CONFIG_FILE);
        let mut config = if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)?
        } else if let Ok(env_config) = std::env::var("GREETER_CONFIG") {
            Self::load_from_file(env_config)?
        } else if default_file.exists() {
            Self::load_from_file(default_file)?
        } else {
            Self::default()
        };

        if let Some(data_dir) = cli_data_dir {
            config.data_dir = data_dir;
        } else if let Ok(env_data_dir) = std::env::var("GREETER_DATA_DIR") {
            config.data_dir = PathBuf::from(env_data_dir);
        }

        std::fs::create_dir_all(&config.data_dir)?;
        Ok(config)
    }

    /// Where `config set` writes to.
    pub fn target_file(&self) -> PathBuf {
        self.source.clone().unwrap_or_else(|| self.data_dir.join(CONFIG_FILE))
    }

    pub fn dev_chain_file(&self) -> PathBuf {
        self.data_dir.join(DEV_CHAIN_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn contract_target(&self) -> Result<ContractTarget> {
        let address = parse_address(&self.contract.address)?;
        let abi = match &self.contract.abi_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).with_context(|| format!("reading ABI {}", path.display()))?;
                Abi::from_json(&json)?
            }
            None => Abi::greeter()?,
        };
        Ok(ContractTarget { address, abi })
    }

    /// Validate and apply a single `section.key` update.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "contract.address" => {
                parse_address(value)?;
                self.contract.address = value.to_string();
            }
            "contract.abi_path" => {
                self.contract.abi_path = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            }
            "wallet.provider" => {
                self.wallet.provider = match value {
                    "dev" => ProviderKind::Dev,
                    "none" => ProviderKind::None,
                    _ => return Err(anyhow!("Invalid provider. Valid options: dev, none")),
                };
            }
            "wallet.account_index" => {
                let index = parse::<usize>(value)?;
                if index >= self.dev.accounts {
                    return Err(anyhow!("Account index must be below dev.accounts ({})", self.dev.accounts));
                }
                self.wallet.account_index = index;
            }
            "wallet.persist_dev_chain" => self.wallet.persist_dev_chain = parse(value)?,
            "dev.accounts" => {
                let accounts = parse::<usize>(value)?;
                if !(1..=32).contains(&accounts) {
                    return Err(anyhow!("dev.accounts must be between 1 and 32"));
                }
                if accounts <= self.wallet.account_index {
                    return Err(anyhow!(
                        "dev.accounts must stay above wallet.account_index ({})",
                        self.wallet.account_index
                    ));
                }
                self.dev.accounts = accounts;
            }
            "dev.block_time_ms" => {
                let block_time = parse::<u64>(value)?;
                if block_time > 60_000 {
                    return Err(anyhow!("Block time must be at most 60000ms"));
                }
                self.dev.block_time_ms = block_time;
            }
            "dev.authorize" => self.dev.authorize = parse(value)?,
            "dev.revert_names" => {
                self.dev.revert_names = value.split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_string).collect();
            }
            "ui.refresh_rate_ms" => {
                let rate = parse::<u64>(value)?;
                if !(50..=10_000).contains(&rate) {
                    return Err(anyhow!("Refresh rate must be between 50 and 10000ms"));
                }
                self.ui.refresh_rate_ms = rate;
            }
            "ui.show_debug_info" => self.ui.show_debug_info = parse(value)?,
            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| anyhow!("Invalid value: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_deployed_contract() {
        let config = GreeterConfig::default();
        let target = config.contract_target().unwrap();
        assert_eq!(target.address, parse_address(DEFAULT_GREETER_ADDRESS).unwrap());
        assert_eq!(target.abi.functions().len(), 3);
        assert_eq!(config.wallet.provider, ProviderKind::Dev);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = GreeterConfig {
            data_dir: dir.path().to_path_buf(),
            ..GreeterConfig::default()
        };
        config.set_value("wallet.provider", "none").unwrap();
        config.set_value("dev.revert_names", "Mallory, Trent").unwrap();
        config.save_to_file(&path).unwrap();

        let loaded = GreeterConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.wallet.provider, ProviderKind::None);
        assert_eq!(loaded.dev.revert_names, vec!["Mallory", "Trent"]);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.target_file(), path);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[dev]\nblock_time_ms = 5\n").unwrap();

        let config = GreeterConfig::load_from_file(&path).unwrap();
        assert_eq!(config.dev.block_time_ms, 5);
        assert_eq!(config.dev.accounts, DevChainConfig::default().accounts);
        assert_eq!(config.contract.address, DEFAULT_GREETER_ADDRESS);
    }

    #[test]
    fn test_cli_flags_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        GreeterConfig::default().save_to_file(&path).unwrap();
        let data_dir = dir.path().join("data");

        let config = GreeterConfig::resolve_config(Some(path), Some(data_dir.clone())).unwrap();
        assert_eq!(config.data_dir, data_dir);
        assert!(data_dir.is_dir());
        assert_eq!(config.dev_chain_file(), data_dir.join(DEV_CHAIN_FILE));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = GreeterConfig::default();
        assert!(config.set_value("contract.address", "0x1234").is_err());
        assert!(config.set_value("wallet.provider", "metamask").is_err());
        assert!(config.set_value("wallet.account_index", "3").is_err());
        assert!(config.set_value("ui.refresh_rate_ms", "5").is_err());
        assert!(config.set_value("dev.authorize", "maybe").is_err());
        assert!(config.set_value("nope", "1").is_err());
        assert_eq!(config, GreeterConfig::default());
    }

    #[test]
    fn test_abi_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abi.json");
        std::fs::write(&path, greeter_core::abi::GREETER_ABI_JSON).unwrap();

        let mut config = GreeterConfig::default();
        config.set_value("contract.abi_path", path.to_str().unwrap()).unwrap();
        assert_eq!(config.contract_target().unwrap().abi, Abi::greeter().unwrap());

        config.set_value("contract.abi_path", dir.path().join("missing.json").to_str().unwrap()).unwrap();
        assert!(config.contract_target().is_err());
    }

    #[test]
    fn test_account_count_stays_above_selected_index() {
        let mut config = GreeterConfig::default();
        config.set_value("wallet.account_index", "2").unwrap();

        assert!(config.set_value("dev.accounts", "2").is_err());
        assert!(config.set_value("dev.accounts", "1").is_err());
        assert_eq!(config.dev.accounts, 3);

        config.set_value("wallet.account_index", "0").unwrap();
        config.set_value("dev.accounts", "1").unwrap();
        assert_eq!(config.dev.accounts, 1);
    }
}
