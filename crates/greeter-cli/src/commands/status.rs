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

use super::{CommandContext, ConsoleNotifier};
use crate::config::ProviderKind;
use anyhow::Result;

pub fn show_status(ctx: &CommandContext) -> Result<()> {
    println!("Greeter Status");
    println!("==============");

    let target = ctx.config.contract_target()?;
    println!("Contract: {}", target.address);
    for function in target.abi.functions() {
        let selector: String = function.selector().iter().map(|b| format!("{:02x}", b)).collect();
        println!("  0x{}  {} [{}]", selector, function.signature(), function.state_mutability);
    }
    println!();

    let provider_name = match ctx.config.wallet.provider {
        ProviderKind::Dev => "dev chain",
        ProviderKind::None => "none",
    };
    println!("Wallet provider: {}", provider_name);

    let mut shell = ctx.shell()?;
    let connected = ctx.runtime.block_on(async {
        let account = shell.connect(ctx.provider(), &ConsoleNotifier).await?;
        let chain_id = match ctx.provider() {
            Some(provider) => Some(provider.chain_id().await?),
            None => None,
        };
        Ok::<_, anyhow::Error>((account, chain_id))
    });

    match connected {
        Ok((account, chain_id)) => {
            println!("  Account: {}", account);
            if let Some(chain_id) = chain_id {
                println!("  Chain ID: {}", chain_id);
            }
            println!("  Status: Connected");
        }
        Err(e) => {
            println!("  Status: Not connected ({})", e);
        }
    }

    if let Some(chain) = &ctx.dev_chain {
        println!();
        println!("Dev chain:");
        println!("  Block: {}", chain.block_number());
        println!("  Stored names: {}", chain.submitted_names(target.address).len());
        match chain.snapshot_path() {
            Some(path) => println!("  Snapshot: {}", path.display()),
            None => println!("  Snapshot: in-memory"),
        }
    }

    Ok(())
}
