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

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::tui::app::{App, Focus};
use greeter_core::ConnectionState;

pub const TITLE: &str = "Hello World DApp";
pub const NAME_PLACEHOLDER: &str = "Your name";

/// Render the UI for the application.
pub fn ui(f: &mut Frame<'_>, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title and connection
            Constraint::Length(3), // Name form
            Constraint::Length(3), // Greeting
            Constraint::Min(0),    // Submitted names
            Constraint::Length(3), // Footer
        ])
        .split(size);

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_greeting(f, app, chunks[2]);
    render_names(f, app, chunks[3]);
    render_footer(f, app, chunks[4]);

    if app.show_help {
        render_help_popup(f, size);
    }

    if app.show_debug {
        render_debug_popup(f, app, size);
    }

    // The alert blocks everything else, so it goes on top.
    if let Some(message) = &app.alert {
        render_alert_popup(f, message, size);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let (label, color) = match app.shell.connection() {
        ConnectionState::Connected { account } => (format!("Connected: {}", account), Color::Green),
        ConnectionState::Connecting => ("Connecting...".to_string(), Color::Yellow),
        ConnectionState::Disconnected => ("Disconnected".to_string(), Color::Gray),
        ConnectionState::Unavailable => ("No wallet".to_string(), Color::Red),
        ConnectionState::Failed(_) => ("Connection failed".to_string(), Color::Red),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(label, Style::default().fg(color)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn focus_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_form(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default().direction(Direction::Horizontal).constraints([Constraint::Min(0), Constraint::Length(14)]).split(area);

    let border = if app.focus == Focus::NameField { Color::Yellow } else { Color::White };
    let input = if app.form.value().is_empty() {
        Paragraph::new(NAME_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.form.value())
    };
    let input = input.block(
        Block::default()
            .borders(Borders::ALL)
            .title("Enter your name")
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, chunks[0]);

    let label = if app.shell.is_submitting() { "Sending..." } else { "Submit" };
    let button = Paragraph::new(label)
        .style(focus_style(app, Focus::SubmitButton))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(button, chunks[1]);

    if app.focus == Focus::NameField && app.alert.is_none() {
        let offset = app.form.value().chars().count() as u16;
        let x = (chunks[0].x + 1 + offset).min(chunks[0].x + chunks[0].width.saturating_sub(2));
        f.set_cursor(x, chunks[0].y + 1);
    }
}

fn render_greeting(f: &mut Frame<'_>, app: &App, area: Rect) {
    let greeting = Paragraph::new(app.shell.greeting())
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Greeting"));
    f.render_widget(greeting, area);
}

fn render_names(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default().direction(Direction::Vertical).constraints([Constraint::Length(3), Constraint::Min(0)]).split(area);

    let label = if app.shell.is_fetching() { "Fetching..." } else { "Fetch Names" };
    let button = Paragraph::new(label)
        .style(focus_style(app, Focus::FetchButton))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    let button_area = Rect { width: chunks[0].width.min(20), ..chunks[0] };
    f.render_widget(button, button_area);

    let names: Vec<ListItem> = app.shell.submitted_names().iter().map(|name| ListItem::new(name.as_str())).collect();
    let list = List::new(names).block(Block::default().borders(Borders::ALL).title("Submitted Names"));
    f.render_widget(list, chunks[1]);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default().direction(Direction::Horizontal).constraints([Constraint::Min(0), Constraint::Length(44)]).split(area);

    let (text, is_error) = app.status_line();
    let style = if is_error { Style::default().fg(Color::Red) } else { Style::default() };
    let status = Paragraph::new(text).style(style).block(Block::default().borders(Borders::ALL).title("Status")).wrap(Wrap { trim: true });
    f.render_widget(status, chunks[0]);

    let help_text = "Ctrl+Q: Quit | F1: Help | Tab: Next | Ctrl+F: Fetch";
    let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title("Controls")).alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 60, area);

    let help_text = vec![
        Line::from("Greeter - Help"),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Tab / Shift+Tab  - Move between name, Submit and Fetch Names"),
        Line::from("  Enter            - Submit the name or fetch, by focus"),
        Line::from("  Esc              - Close popups"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  Ctrl+F           - Fetch submitted names"),
        Line::from("  Ctrl+R           - Reconnect the wallet"),
        Line::from("  Ctrl+Q / Ctrl+C  - Quit application"),
        Line::from("  F1               - Toggle this help"),
        Line::from("  F2               - Toggle debug info"),
        Line::from(""),
        Line::from("Press F1 or 'Esc' to close this help."),
    ];

    let help_paragraph = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL).title("Help")).wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(help_paragraph, popup_area);
}

fn render_debug_popup(f: &mut Frame<'_>, app: &App, area: Rect) {
    let popup_area = centered_rect(60, 50, area);
    let target = app.shell.target();

    let debug_text = vec![
        Line::from("Debug Information"),
        Line::from(""),
        Line::from(format!("Contract: {}", target.address)),
        Line::from(format!("Functions: {}", target.abi.functions().len())),
        Line::from(format!("Connection: {:?}", app.shell.connection())),
        Line::from(format!("Submitting: {}", app.shell.is_submitting())),
        Line::from(format!("Fetching: {}", app.shell.is_fetching())),
        Line::from(format!("Names: {}", app.shell.submitted_names().len())),
        Line::from(format!("Focus: {:?}", app.focus)),
        Line::from(format!("Last Update: {:?}", app.last_update)),
        Line::from(""),
        Line::from("Press F2 or 'Esc' to close."),
    ];

    let debug_paragraph = Paragraph::new(debug_text).block(Block::default().borders(Borders::ALL).title("Debug")).wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(debug_paragraph, popup_area);
}

fn render_alert_popup(f: &mut Frame<'_>, message: &str, area: Rect) {
    let popup_area = centered_rect(50, 25, area);

    let alert_text = vec![Line::from(""), Line::from(message.to_string()), Line::from(""), Line::from("Press Enter to continue.")];

    let alert = Paragraph::new(alert_text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Alert").border_style(Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(alert, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
