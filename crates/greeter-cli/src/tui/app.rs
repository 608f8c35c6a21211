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

use crate::commands::CommandContext;
use crate::tui::events::{AppEvent, TuiNotifier};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use greeter_core::{ConnectionState, NameForm, Shell, WalletEvent, WalletProvider};
use std::future::Future;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    NameField,
    SubmitButton,
    FetchButton,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::NameField => Focus::SubmitButton,
            Focus::SubmitButton => Focus::FetchButton,
            Focus::FetchButton => Focus::NameField,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::NameField => Focus::FetchButton,
            Focus::SubmitButton => Focus::NameField,
            Focus::FetchButton => Focus::SubmitButton,
        }
    }
}

pub struct App {
    pub context: CommandContext,
    pub shell: Shell,
    pub form: NameForm,
    pub focus: Focus,
    pub alert: Option<String>,
    pub notifier: TuiNotifier,
    pub show_help: bool,
    pub show_debug: bool,
    pub last_update: Instant,
    pub status_message: String,
    pub should_quit: bool,
    provider: Option<Arc<dyn WalletProvider>>,
    events_tx: Sender<AppEvent>,
    events_rx: Receiver<AppEvent>,
    wallet_events: Option<broadcast::Receiver<WalletEvent>>,
}

impl App {
    pub fn new(context: CommandContext) -> Result<Self> {
        let shell = context.shell()?;
        let provider = context.provider();
        let show_debug = context.config.ui.show_debug_info;
        let (events_tx, events_rx) = mpsc::channel();

        Ok(Self {
            context,
            shell,
            form: NameForm::new(),
            focus: Focus::NameField,
            alert: None,
            notifier: TuiNotifier::new(),
            show_help: false,
            show_debug,
            last_update: Instant::now(),
            status_message: "Welcome to Greeter. Press F1 for help.".to_string(),
            should_quit: false,
            provider,
            events_tx,
            events_rx,
            wallet_events: None,
        })
    }

    /// Connect once the UI is up.
    pub fn start(&mut self) {
        self.wallet_events = self.provider.as_ref().and_then(|provider| provider.events());
        self.reconnect();
        self.tick();
    }

    pub fn reconnect(&mut self) {
        match self.shell.begin_connect(self.provider.clone(), &self.notifier) {
            Ok(Some(request)) => {
                self.status_message = "Connecting to wallet...".to_string();
                self.spawn(async move { AppEvent::Connected(request.execute().await) });
            }
            Ok(None) => {
                self.status_message = "Already connected".to_string();
            }
            Err(e) => {
                self.status_message = format!("Connection error: {}", e);
            }
        }
    }

    pub fn submit(&mut self) {
        let name = match self.form.submit() {
            Ok(name) => name,
            Err(e) => {
                self.status_message = e.to_string();
                self.focus = Focus::NameField;
                return;
            }
        };

        match self.shell.begin_submit(&name) {
            Ok(request) => {
                self.status_message = format!("Submitting greeting for {}...", request.name());
                self.spawn(async move { AppEvent::Submitted(request.execute().await) });
            }
            Err(e) => {
                self.status_message = format!("Submit error: {}", e);
            }
        }
    }

    pub fn fetch(&mut self) {
        match self.shell.begin_fetch() {
            Ok(request) => {
                self.status_message = "Fetching submitted names...".to_string();
                self.spawn(async move { AppEvent::Fetched(request.execute().await) });
            }
            Err(e) => {
                self.status_message = format!("Fetch error: {}", e);
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.context.runtime.spawn(async move {
            // receiver gone means the app is shutting down
            let _ = tx.send(task.await);
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alert = None;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.reconnect(),
            KeyCode::Char('f') if ctrl => self.fetch(),
            KeyCode::F(1) => self.toggle_help(),
            KeyCode::F(2) => self.toggle_debug(),
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => self.handle_enter(),
            KeyCode::Backspace if self.focus == Focus::NameField => self.form.backspace(),
            KeyCode::Char(c) if self.focus == Focus::NameField && !ctrl => self.form.insert(c),
            _ => {}
        }
    }

    pub fn handle_enter(&mut self) {
        match self.focus {
            Focus::NameField | Focus::SubmitButton => self.submit(),
            Focus::FetchButton => self.fetch(),
        }
    }

    pub fn handle_escape(&mut self) {
        self.show_help = false;
        self.show_debug = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            debug!("Processing {:?}", event);
            match event {
                AppEvent::Connected(result) => match self.shell.complete_connect(result) {
                    Ok(account) => self.status_message = format!("Connected as {}", account),
                    Err(e) => self.status_message = format!("Connection error: {}", e),
                },
                AppEvent::Submitted(outcome) => match self.shell.complete_submit(outcome) {
                    Ok(receipt) => {
                        self.status_message = format!("Greeting included in block {} ({})", receipt.block_number, receipt.transaction_hash);
                    }
                    Err(e) => self.status_message = format!("Submit error: {}", e),
                },
                AppEvent::Fetched(outcome) => match self.shell.complete_fetch(outcome) {
                    Ok(names) => self.status_message = format!("Fetched {} names", names.len()),
                    Err(e) => self.status_message = format!("Fetch error: {}", e),
                },
            }
        }
    }

    fn process_wallet_events(&mut self) {
        let Some(receiver) = self.wallet_events.as_mut() else {
            return;
        };

        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    if self.shell.handle_wallet_event(&event) {
                        info!("Wallet event {:?} dropped the contract handle", event);
                        self.status_message = "Wallet changed. Press Ctrl+R to reconnect.".to_string();
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => debug!("Skipped {} wallet events", skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    pub fn tick(&mut self) {
        self.process_events();
        self.process_wallet_events();
        if self.alert.is_none() {
            self.alert = self.notifier.pop();
        }
        self.last_update = Instant::now();
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.shell.connection(), ConnectionState::Connected { .. }) && self.shell.contract().is_some()
    }

    /// Footer text, and whether it reports the shell's last failure.
    pub fn status_line(&self) -> (&str, bool) {
        let is_error = self.shell.last_error().is_some_and(|err| self.status_message.contains(err));
        (&self.status_message, is_error)
    }

    pub fn get_refresh_rate(&self) -> u64 {
        self.context.config.ui.refresh_rate_ms
    }
}
