use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{AppState, QuoteMode, SettingsField, View},
    planner::ReminderMode,
    settings::format_time,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub sky_color: Color,
    pub grass_color: Color,
    pub card_color: Color,
    pub border_color: Color,
    pub accent_color: Color,
    pub day_on_color: Color,
}

pub const THEMES: &[&str] = &["meadow", "nord", "dracula", "gruvbox"];

pub fn get_theme(name: &str) -> Theme {
    match name {
        "nord" => Theme {
            sky_color: Color::Rgb(136, 192, 208),
            grass_color: Color::Rgb(163, 190, 140),
            card_color: Color::Rgb(236, 239, 244),
            border_color: Color::Rgb(129, 161, 193),
            accent_color: Color::Rgb(235, 203, 139),
            day_on_color: Color::Rgb(94, 129, 172),
        },
        "dracula" => Theme {
            sky_color: Color::Rgb(98, 114, 164),
            grass_color: Color::Rgb(80, 250, 123),
            card_color: Color::Rgb(248, 248, 242),
            border_color: Color::Rgb(189, 147, 249),
            accent_color: Color::Rgb(255, 121, 198),
            day_on_color: Color::Rgb(139, 233, 253),
        },
        "gruvbox" => Theme {
            sky_color: Color::Rgb(131, 165, 152),
            grass_color: Color::Rgb(184, 187, 38),
            card_color: Color::Rgb(251, 241, 199),
            border_color: Color::Rgb(250, 189, 47),
            accent_color: Color::Rgb(254, 128, 25),
            day_on_color: Color::Rgb(69, 133, 136),
        },
        _ => Theme {
            sky_color: Color::Rgb(100, 149, 237),
            grass_color: Color::Rgb(75, 134, 112),
            card_color: Color::Rgb(242, 242, 247),
            border_color: Color::Rgb(55, 114, 92),
            accent_color: Color::Rgb(255, 204, 0),
            day_on_color: Color::Rgb(0, 122, 255),
        },
    }
}

/// Frame styling for one screen. Each renderer gets its own and nothing
/// outlives the draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chrome {
    pub title: &'static str,
    pub border: Color,
    pub title_color: Color,
}

impl Chrome {
    pub fn for_view(view: View, theme: &Theme) -> Self {
        match view {
            View::Home => Self { title: " 🐶 BEAGLE ", border: theme.sky_color, title_color: theme.accent_color },
            View::Quotes => Self { title: " Add some motivation! ", border: theme.border_color, title_color: theme.accent_color },
            View::Settings => Self { title: " Notifications ", border: theme.grass_color, title_color: Color::White },
            View::Help => Self { title: " Help ", border: theme.border_color, title_color: theme.accent_color },
        }
    }

    fn block(&self) -> Block<'static> {
        Block::default()
            .title(Span::styled(self.title, Style::default().fg(self.title_color).add_modifier(Modifier::BOLD)))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.border))
    }
}

// ============================================================================
// UI Rendering
// ============================================================================

pub fn render_ui(f: &mut Frame, app: &AppState) {
    let chrome = Chrome::for_view(app.current_view, &app.theme);
    match app.current_view {
        View::Home => render_home(f, app, &chrome),
        View::Quotes => render_quotes(f, app, &chrome),
        View::Settings => render_settings(f, app, &chrome),
        View::Help => render_help(f, app, &chrome),
    }
}

fn render_home(f: &mut Frame, app: &AppState, chrome: &Chrome) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let outer = chrome.block();
    let inner = outer.inner(chunks[0]);
    f.render_widget(outer, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("☁️                ☁️").alignment(Alignment::Center),
        sections[0],
    );

    // Speech bubble
    let bubble = centered_width(34, sections[1]);
    f.render_widget(
        Paragraph::new("Shake for some motivation!")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(app.theme.card_color))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)),
        bubble,
    );

    // The dog wags while waiting for a shake.
    let dog = if app.showing_bone || app.animation_frame < 10 { "🐶" } else { "🐕" };
    f.render_widget(
        Paragraph::new(dog).alignment(Alignment::Center).style(Style::default().add_modifier(Modifier::BOLD)),
        sections[3],
    );

    if app.showing_bone {
        let card = centered_width(60, sections[5]);
        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled("🐾", Style::default().fg(Color::Black))),
                Line::from(""),
                Line::from(Span::styled(app.displayed_quote.as_str(), Style::default().fg(Color::Black))),
            ])
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().bg(app.theme.card_color))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.accent_color))),
            card,
        );
    }

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.grass_color)),
        sections[6],
    );

    let controls = vec![
        Line::from(vec![
            span_key("S", app), Span::raw(" / "),
            span_key("←→←→", app), Span::raw(" Shake  •  "),
            span_key("B", app), Span::raw(" Back  •  "),
            span_key("A", app), Span::raw(" Quotes  •  "),
            span_key("G", app), Span::raw(" Reminders  •  "),
            span_key("H", app), Span::raw(" Help  •  "),
            span_key("Q", app), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP)),
        chunks[1],
    );
}

fn span_key<'a>(text: &'a str, app: &AppState) -> Span<'a> {
    Span::styled(text, Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))
}

fn render_help(f: &mut Frame, app: &AppState, chrome: &Chrome) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("⌨️  KEYBOARD SHORTCUTS", Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  Home:"),
        help_line("S", "Shake for a quote"),
        help_line("← → ← →", "Shake by wiggling"),
        help_line("B", "Put the quote away"),
        help_line("A", "Edit your quotes"),
        help_line("G", "Motivation reminders"),
        Line::from(""),
        Line::from("  Quotes:"),
        help_line("A / N", "Add a quote"),
        help_line("E / Enter", "Edit selected quote"),
        help_line("D", "Delete selected quote"),
        help_line("F / Esc", "Finished (saves)"),
        Line::from(""),
        Line::from("  Reminders:"),
        help_line("↑↓ / JK", "Move between rows"),
        help_line("←→ / HL", "Move between days"),
        help_line("Space", "Toggle switch or day"),
        help_line("Enter", "Edit a time (HH:MM)"),
        help_line("F", "Finished (saves and schedules)"),
        help_line("Esc", "Discard changes"),
        Line::from(""),
        help_line("Q / Ctrl+C", "Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to go back",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Paragraph::new(help_text).block(chrome.block()), area);
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn render_quotes(f: &mut Frame, app: &AppState, chrome: &Chrome) {
    let area = centered_rect(80, 85, f.size());

    let help = match app.quote_mode {
        QuoteMode::Viewing => "  a/n: Add  •  e: Edit  •  d: Delete  •  ↑↓/jk: Navigate  •  f/Esc: Finished",
        QuoteMode::Editing => "  Type and press Enter to keep  •  Esc to cancel",
        QuoteMode::ConfirmingDelete => "  Y: Delete  •  N/Esc: Keep",
    };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
        Line::from(""),
    ];

    if app.quotes.is_empty() {
        lines.push(Line::from(Span::styled("  No quotes yet! Press 'a' to add one.", Style::default().fg(Color::Gray))));
    }

    for (idx, quote) in app.quotes.quotes().iter().enumerate() {
        let selected = app.selected_quote == Some(idx);
        let prefix = if selected { "► " } else { "  " };
        let style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let text = if selected && app.quote_mode == QuoteMode::Editing {
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::Yellow)),
                Span::styled(app.quote_input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ])
        } else if selected && app.quote_mode == QuoteMode::ConfirmingDelete {
            Line::from(vec![
                Span::styled("⚠️  DELETE? ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(quote.text.as_str(), style),
            ])
        } else {
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(app.theme.accent_color)),
                Span::styled(if quote.text.is_empty() { "…" } else { quote.text.as_str() }, style),
            ])
        };
        lines.push(text);
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(chrome.block()),
        area,
    );
}

fn render_settings(f: &mut Frame, app: &AppState, chrome: &Chrome) {
    let area = centered_rect(70, 85, f.size());
    let s = &app.settings;

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  ↑↓/jk: Rows  •  ←→/hl: Days  •  Space: Toggle  •  Enter: Edit  •  f: Finished  •  Esc: Discard",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    for mode in [ReminderMode::Random, ReminderMode::Fixed] {
        let enabled = s.enabled(mode);
        let header = match mode {
            ReminderMode::Random => "🎲 RANDOM MOTIVATION",
            ReminderMode::Fixed => "⏰ SET TIME MOTIVATION",
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(header, Style::default().fg(chrome.title_color).add_modifier(Modifier::BOLD))));

        let rows: &[(SettingsField, &str, String)] = &match mode {
            ReminderMode::Random => vec![
                (SettingsField::RandomEnabled, "Enabled", on_off(enabled)),
                (SettingsField::RandomDays, "Days Active", String::new()),
                (SettingsField::WindowStart, "Earliest Time", format_time(s.window_start)),
                (SettingsField::WindowEnd, "Latest Time", format_time(s.window_end)),
            ],
            ReminderMode::Fixed => vec![
                (SettingsField::FixedEnabled, "Enabled", on_off(enabled)),
                (SettingsField::FixedDays, "Days Active", String::new()),
                (SettingsField::FixedTime, "Time", format_time(s.notification_time)),
            ],
        };

        for (field, label, value) in rows {
            let selected = app.settings_field == *field;
            let live = enabled || matches!(field, SettingsField::RandomEnabled | SettingsField::FixedEnabled);
            let label_style = match (selected, live) {
                (true, _) => Style::default().fg(app.theme.accent_color).add_modifier(Modifier::BOLD),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::DarkGray),
            };

            let mut spans = vec![
                Span::styled(if selected { "  > " } else { "    " }, label_style),
                Span::styled(format!("{label:<14}"), label_style),
            ];

            if matches!(field, SettingsField::RandomDays | SettingsField::FixedDays) {
                for (i, day) in s.days(mode).iter().enumerate() {
                    let bg = if day.selected && enabled { app.theme.day_on_color } else { Color::DarkGray };
                    let mut style = Style::default().fg(Color::White).bg(bg);
                    if selected && i == app.day_cursor {
                        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                    }
                    spans.push(Span::styled(format!(" {} ", day.label), style));
                    spans.push(Span::raw(" "));
                }
            } else if selected && app.settings_editing {
                spans.push(Span::styled(app.settings_input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)));
                spans.push(Span::styled("█", Style::default().fg(Color::Green)));
            } else {
                spans.push(Span::styled(value.clone(), label_style));
            }
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(""));
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(format!("  {status}"), Style::default().fg(Color::Yellow))));
    }

    f.render_widget(Paragraph::new(lines).block(chrome.block()), area);
}

fn on_off(on: bool) -> String {
    if on { "ON" } else { "OFF" }.into()
}

fn centered_width(w: u16, r: Rect) -> Rect {
    let w = w.min(r.width);
    Rect { x: r.x + (r.width - w) / 2, width: w, ..r }
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn draw(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn every_theme_name_resolves() {
        for name in THEMES {
            let _ = get_theme(name);
        }
        assert_eq!(get_theme("unknown"), get_theme("meadow"));
    }

    #[test]
    fn settings_chrome_is_scoped_to_the_settings_screen() {
        let theme = get_theme("meadow");
        let settings = Chrome::for_view(View::Settings, &theme);
        let home = Chrome::for_view(View::Home, &theme);
        assert_ne!(settings, home);
        assert_eq!(settings.title, " Notifications ");
    }

    #[test]
    fn home_screen_shows_the_shaken_quote() {
        let mut app = AppState::new(Arc::new(MemoryStore::default()), "meadow");
        assert!(draw(&app).contains("Shake for some motivation!"));

        app.on_shake();
        let first_words: String = app.displayed_quote.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
        assert!(draw(&app).contains(&first_words));
    }
}
