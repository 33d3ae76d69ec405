pub mod card;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Field, Popup};
use crate::search::{Phase, SearchState};
use crate::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Below this width cards stack in a single column
const TWO_COLUMN_WIDTH: u16 = 100;

pub const EMPTY_HINT: &str = "Start by entering a seed keyword above to begin your research!";

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let error_height = if app.search.error.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // Info line
            Constraint::Length(3),             // Input form
            Constraint::Length(error_height),  // Error banner
            Constraint::Min(4),                // Results
            Constraint::Length(1),             // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_input(f, app, chunks[1]);
    if let Some(error) = &app.search.error {
        draw_error(f, error, &app.theme, chunks[2]);
    }
    draw_results(f, &app.search, app.scroll, app.spinner_frame, &app.theme, chunks[3]);
    draw_footer(f, &app.theme, chunks[4]);

    if app.popup == Popup::Help {
        draw_help_popup(f, &app.theme);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let (key_icon, key_text, key_color) = if app.selecting_key {
        ("◌", "Selecting key...", t.caution)
    } else if app.search.has_api_key {
        ("●", "API key ready", t.good)
    } else {
        ("○", "No API key (Ctrl+K to select)", t.danger)
    };

    let mut spans = vec![
        Span::styled(" keyscout ", Style::default().fg(t.accent).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(t.inactive)),
        Span::styled(app.model.as_str(), Style::default().fg(t.text_dim)),
        Span::styled(" │ ", Style::default().fg(t.inactive)),
        Span::styled(key_icon, Style::default().fg(key_color)),
        Span::styled(format!(" {}", key_text), Style::default().fg(key_color)),
    ];

    if let Some(status) = &app.status_message {
        spans.push(Span::styled(" │ ", Style::default().fg(t.inactive)));
        spans.push(Span::styled(status.as_str(), Style::default().fg(t.warning)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(16)])
        .split(area);

    // Busy greys the form out; typing is still accepted but Enter is gated
    let input_box = |title: &'static str, value: &str, focused: bool| {
        let border = if app.search.busy {
            t.inactive
        } else if focused {
            t.accent
        } else {
            t.inactive
        };
        let cursor = if focused && !app.search.busy { "_" } else { "" };

        Paragraph::new(format!("{}{}", value, cursor))
            .style(Style::default().fg(t.text))
            .block(
                Block::default()
                    .title(Span::styled(title, Style::default().fg(if focused { t.accent } else { t.header })))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
    };

    f.render_widget(input_box(" Seed keyword ", &app.seed_input, app.field == Field::Seed), chunks[0]);
    f.render_widget(input_box(" Count (1-20) ", &app.count_input, app.field == Field::Count), chunks[1]);
}

fn draw_error(f: &mut Frame, error: &str, t: &Theme, area: Rect) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("Error! ", Style::default().fg(t.danger).add_modifier(Modifier::BOLD)),
        Span::styled(error, Style::default().fg(t.danger)),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.danger)),
    );
    f.render_widget(banner, area);
}

fn draw_results(f: &mut Frame, search: &SearchState, scroll: usize, spinner_frame: usize, t: &Theme, area: Rect) {
    let title = match search.phase() {
        Phase::Results => format!(" Results ({}) ", search.suggestions.len()),
        _ => " Results ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(t.header)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.inactive));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match search.phase() {
        Phase::Busy => {
            let frame = SPINNER[spinner_frame % SPINNER.len()];
            let spinner = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} Generating keywords...", frame),
                    Style::default().fg(t.accent),
                )),
            ])
            .alignment(Alignment::Center);
            f.render_widget(spinner, inner);
        }
        Phase::Idle => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(EMPTY_HINT, Style::default().fg(t.text_dim))),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            f.render_widget(hint, inner);
        }
        Phase::Failed => {}
        Phase::Results => draw_cards(f, search, scroll, t, inner),
    }
}

/// Lay cards out in rows, one or two per row depending on width
fn draw_cards(f: &mut Frame, search: &SearchState, scroll: usize, t: &Theme, area: Rect) {
    let cards = card::cards(&search.suggestions);
    let columns: usize = if area.width >= TWO_COLUMN_WIDTH { 2 } else { 1 };
    let col_width = area.width / columns as u16;

    // Keep rows aligned when scrolling a two-column grid
    let start = ((scroll / columns) * columns).min(cards.len().saturating_sub(1));

    let mut y = area.y;
    for row in cards[start..].chunks(columns) {
        if y >= area.bottom() {
            break;
        }
        let wanted = row.iter().map(|c| c.height(col_width, t)).max().unwrap_or(0);
        let height = wanted.min(area.bottom() - y);

        for (i, card) in row.iter().enumerate() {
            let rect = Rect {
                x: area.x + i as u16 * col_width,
                y,
                width: col_width,
                height,
            };
            let widget = Paragraph::new(card.lines(t))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(Span::styled(
                            format!(" {} ", card.title),
                            Style::default().fg(t.text).add_modifier(Modifier::BOLD),
                        ))
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(t.inactive)),
                );
            f.render_widget(widget, rect);
        }
        y += height;
    }
}

fn draw_footer(f: &mut Frame, t: &Theme, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(t.accent));
    let desc = |d: &'static str| Span::styled(d, Style::default().fg(t.text_dim));

    let footer = Paragraph::new(Line::from(vec![
        key("Enter"), desc(" generate  "),
        key("Tab"), desc(" field  "),
        key("↑/↓"), desc(" scroll  "),
        key("Ctrl+K"), desc(" API key  "),
        key("F1"), desc(" help  "),
        key("Esc"), desc(" quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, t: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(t.header).add_modifier(Modifier::BOLD)))
    };
    let entry = |k: &'static str, d: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(t.accent)),
            Span::raw(d),
        ])
    };

    let help_text = vec![
        section("═══ Search ═══"),
        entry("  Enter       ", "Generate keywords for the seed"),
        entry("  Tab         ", "Switch between seed and count"),
        entry("  Ctrl+U      ", "Clear the focused field"),
        Line::from(""),
        section("═══ Results ═══"),
        entry("  ↑/↓ PgUp/Dn ", "Scroll through cards"),
        entry("  Home        ", "Back to the first card"),
        Line::from(""),
        section("═══ API Key ═══"),
        entry("  Ctrl+K      ", "Select a key via key_command"),
        Line::from(Span::styled(
            "              or set GEMINI_API_KEY before launching",
            Style::default().fg(t.text_dim),
        )),
        Line::from(""),
        section("═══ Headless ═══"),
        entry("  keyscout --seed \"coffee\" --count 5        ", "Print cards"),
        entry("  keyscout --seed \"coffee\" --json           ", "Print JSON"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(t.text_dim)),
            Span::styled("F1", Style::default().fg(t.accent)),
            Span::styled("/", Style::default().fg(t.text_dim)),
            Span::styled("Esc", Style::default().fg(t.accent)),
            Span::styled(" to close", Style::default().fg(t.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" keyscout Help ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
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
