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

use greeter_core::shell::{FetchOutcome, SubmitOutcome};
use greeter_core::{Greeter, Notifier, ShellError};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Completions reported back to the draw loop by spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    Connected(Result<Greeter, ShellError>),
    Submitted(SubmitOutcome),
    Fetched(FetchOutcome),
}

/// Queues alerts until the draw loop shows them as a blocking popup.
#[derive(Debug, Default)]
pub struct TuiNotifier {
    alerts: Mutex<VecDeque<String>>,
}

impl TuiNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<String> {
        self.alerts.lock().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.alerts.lock().len()
    }
}

impl Notifier for TuiNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().push_back(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_are_fifo() {
        let notifier = TuiNotifier::new();
        notifier.alert("first");
        notifier.alert("second");

        assert_eq!(notifier.pending(), 2);
        assert_eq!(notifier.pop().as_deref(), Some("first"));
        assert_eq!(notifier.pop().as_deref(), Some("second"));
        assert_eq!(notifier.pop(), None);
    }
}
