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

pub mod config;
pub mod dev;
pub mod greet;
pub mod names;
pub mod status;

use crate::config::{GreeterConfig, ProviderKind};
use anyhow::Result;
use greeter_core::{DevChain, Notifier, Shell, WalletProvider, parse_address};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::warn;

pub struct CommandContext {
    pub config: GreeterConfig,
    pub runtime: Runtime,
    pub dev_chain: Option<DevChain>,
}

impl CommandContext {
    pub fn new(config: GreeterConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

        let dev_chain = match config.wallet.provider {
            ProviderKind::Dev => {
                let contract = parse_address(&config.contract.address)?;
                let chain = if config.wallet.persist_dev_chain {
                    DevChain::open(config.dev.clone(), contract, config.dev_chain_file())?
                } else {
                    DevChain::new(config.dev.clone(), contract)?
                };
                chain.wallet().select_account(config.wallet.account_index)?;
                Some(chain)
            }
            ProviderKind::None => None,
        };

        Ok(Self { config, runtime, dev_chain })
    }

    /// The wallet injected into the front-end, if any.
    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.dev_chain.as_ref().map(|chain| Arc::new(chain.wallet()) as Arc<dyn WalletProvider>)
    }

    pub fn shell(&self) -> Result<Shell> {
        Ok(Shell::new(self.config.contract_target()?))
    }

    /// A shell with its contract handle already bound.
    pub fn connected_shell(&self) -> Result<Shell> {
        let mut shell = self.shell()?;
        self.runtime.block_on(shell.connect(self.provider(), &ConsoleNotifier))?;
        Ok(shell)
    }
}

/// Alerts for one-shot commands go straight to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        warn!("{}", message);
        eprintln!("{}", message);
    }
}
