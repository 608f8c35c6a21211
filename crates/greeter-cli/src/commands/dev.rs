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

use super::CommandContext;
use crate::DevCommands;
use anyhow::{Result, anyhow};
use greeter_core::DevChain;

pub fn handle_dev_command(ctx: &CommandContext, command: DevCommands) -> Result<()> {
    let chain = ctx.dev_chain.as_ref().ok_or_else(|| anyhow!("The dev chain is not the configured wallet provider"))?;
    match command {
        DevCommands::Accounts => list_accounts(chain),
        DevCommands::Reset => reset_chain(chain),
    }
}

fn list_accounts(chain: &DevChain) -> Result<()> {
    let selected = chain.wallet().selected_account();
    println!("Dev Accounts (chain {})", chain.config().chain_id);
    for (i, account) in chain.accounts().iter().enumerate() {
        let marker = if *account == selected { "*" } else { " " };
        println!("{} {}  {}", marker, i, account);
    }
    Ok(())
}

fn reset_chain(chain: &DevChain) -> Result<()> {
    chain.reset()?;
    println!("Dev chain reset; all submitted names cleared");
    Ok(())
}
