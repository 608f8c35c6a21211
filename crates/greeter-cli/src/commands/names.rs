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
use anyhow::Result;

pub fn show_names(ctx: &CommandContext, index: Option<u64>, json: bool) -> Result<()> {
    let mut shell = ctx.connected_shell()?;

    if let Some(index) = index {
        let Some(contract) = shell.contract().cloned() else {
            return Err(greeter_core::ShellError::ContractUnavailable.into());
        };
        let name = ctx.runtime.block_on(contract.submitted_name(index))?;
        println!("{}: {}", index, name);
        return Ok(());
    }

    let names = ctx.runtime.block_on(shell.fetch_names())?;

    if json {
        println!("{}", serde_json::to_string_pretty(names)?);
        return Ok(());
    }

    println!("Submitted Names");
    println!("===============");
    if names.is_empty() {
        println!("  (none yet)");
    }
    for (i, name) in names.iter().enumerate() {
        println!("  {}. {}", i, name);
    }

    Ok(())
}
