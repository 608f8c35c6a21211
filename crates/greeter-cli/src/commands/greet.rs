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
use greeter_core::NameForm;

pub fn submit_greeting(ctx: &CommandContext, name: &str) -> Result<()> {
    let mut form = NameForm::new();
    form.set_value(name);
    let name = form.submit()?;

    let mut shell = ctx.connected_shell()?;
    println!("Submitting greeting for {}...", name);

    let receipt = ctx.runtime.block_on(shell.submit(&name))?;

    println!("{}", shell.greeting());
    println!("  Transaction: {}", receipt.transaction_hash);
    println!("  Block: {}", receipt.block_number);
    println!("  From: {}", receipt.from);

    Ok(())
}
