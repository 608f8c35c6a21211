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

use crate::ConfigCommands;
use crate::config::GreeterConfig;
use anyhow::Result;

/// Runs without a `CommandContext`, so a setting that keeps the wallet from
/// starting can still be repaired.
pub fn handle_config_command(config: &GreeterConfig, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(config),
        ConfigCommands::Set { key, value } => set_config(config, &key, &value),
    }
}

fn show_config(config: &GreeterConfig) -> Result<()> {
    println!("Current Configuration");
    println!("====================");

    match &config.source {
        Some(path) => println!("Loaded From: {}", path.display()),
        None => println!("Loaded From: built-in defaults"),
    }
    println!("Data Directory: {}", config.data_dir.display());
    println!();

    println!("Contract:");
    println!("  Address: {}", config.contract.address);
    match &config.contract.abi_path {
        Some(path) => println!("  ABI: {}", path.display()),
        None => println!("  ABI: embedded greeter interface"),
    }
    println!();

    println!("Wallet:");
    println!("  Provider: {:?}", config.wallet.provider);
    println!("  Account Index: {}", config.wallet.account_index);
    println!("  Persist Dev Chain: {}", config.wallet.persist_dev_chain);
    println!();

    println!("Dev Chain:");
    println!("  Chain ID: {}", config.dev.chain_id);
    println!("  Accounts: {}", config.dev.accounts);
    println!("  Block Time: {}ms", config.dev.block_time_ms);
    println!("  Authorize: {}", config.dev.authorize);
    println!("  Revert Names: {}", config.dev.revert_names.join(", "));
    println!();

    println!("UI Settings:");
    println!("  Refresh Rate: {}ms", config.ui.refresh_rate_ms);
    println!("  Debug Info: {}", config.ui.show_debug_info);

    Ok(())
}

fn set_config(config: &GreeterConfig, key: &str, value: &str) -> Result<()> {
    let mut updated = config.clone();
    updated.set_value(key, value)?;

    let path = updated.target_file();
    updated.save_to_file(&path)?;

    println!("{} = {}", key, value);
    println!("Saved to {}", path.display());

    Ok(())
}
