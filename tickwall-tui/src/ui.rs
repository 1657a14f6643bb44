//! Grid rendering: one cell per symbol, background by change bucket,
//! volume tinted by tier, with the hover navbar and the countdown footer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use tickwall_core::{classify, ChangeBucket, CoinRecord, Timeframe, VolumeBucket};

use crate::app::{App, NAVBAR_HEIGHT};

const CELL_WIDTH: u16 = 22;
const CELL_HEIGHT: u16 = 3;
const BASE_BG: Color = Color::Rgb(15, 15, 25);

/// Background for a change bucket; `None` means no highlight
fn change_color(bucket: ChangeBucket) -> Option<Color> {
    match bucket {
        ChangeBucket::Extreme => Some(Color::Rgb(255, 20, 20)),
        ChangeBucket::High => Some(Color::Rgb(187, 0, 250)),
        ChangeBucket::Elevated => Some(Color::Rgb(23, 206, 0)),
        ChangeBucket::Mild => Some(Color::Rgb(25, 133, 0)),
        ChangeBucket::None => None,
    }
}

fn volume_color(bucket: VolumeBucket) -> Color {
    match bucket {
        VolumeBucket::Low => Color::Rgb(128, 128, 150),
        VolumeBucket::Medium => Color::Rgb(255, 215, 0),
        VolumeBucket::Large => Color::Rgb(100, 200, 255),
        VolumeBucket::Max => Color::Rgb(255, 105, 180),
    }
}

/// Compact volume display: 1.2B / 3.4M / 5.6K, two decimals below that
pub fn format_volume(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = if app.navbar_visible {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NAVBAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area)
    };

    if app.navbar_visible {
        render_navbar(f, chunks[0], app);
    }
    let (grid_area, footer_area) = if app.navbar_visible {
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    render_grid(f, grid_area, app);
    render_footer(f, footer_area, app);
}

/// Timeframe toggles plus the connectivity dot, shown only on hover
fn render_navbar(f: &mut Frame, area: Rect, app: &App) {
    let active = app.session.timeframe();
    let mut spans: Vec<Span> = Vec::new();

    for (i, tf) in Timeframe::ALL.iter().enumerate() {
        let style = if *tf == active {
            Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(170, 170, 190))
        };
        spans.push(Span::styled(format!(" F{}:{} ", i + 1, tf), style));
    }

    let (dot, dot_color) = if app.session.is_connected() {
        ("●", Color::Rgb(0, 255, 127))
    } else {
        ("○", Color::Rgb(255, 69, 58))
    };
    spans.push(Span::styled(
        format!("  {dot} "),
        Style::default().fg(dot_color).add_modifier(Modifier::BOLD),
    ));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::Rgb(117, 117, 117)))
        .style(Style::default().bg(Color::Rgb(70, 70, 70)));

    let navbar = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(navbar, area);
}

fn render_grid(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.session.entries();

    if entries.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "waiting for ticker data...",
            Style::default()
                .fg(Color::Rgb(128, 128, 150))
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center)
        .style(Style::default().bg(BASE_BG));
        f.render_widget(waiting, area);
        return;
    }

    let columns = (area.width / CELL_WIDTH).max(1);
    for (i, record) in entries.iter().enumerate() {
        let col = i as u16 % columns;
        let row = i as u16 / columns;
        let y = area.y + row * CELL_HEIGHT;
        if y + CELL_HEIGHT > area.y + area.height {
            break;
        }
        let cell = Rect {
            x: area.x + col * CELL_WIDTH,
            y,
            width: CELL_WIDTH.min(area.width - col * CELL_WIDTH),
            height: CELL_HEIGHT,
        };
        render_cell(f, cell, record, app.search.matches(&record.symbol));
    }
}

fn render_cell(f: &mut Frame, area: Rect, record: &CoinRecord, matched: bool) {
    let (change, volume) = classify::classify(record);
    let bg = change_color(change).unwrap_or(BASE_BG);

    let change_style = if record.is_hot {
        Style::default()
            .fg(Color::Rgb(255, 215, 0))
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).bg(bg)
    };

    let close_color = if record.direction.is_up() {
        Color::Rgb(0, 255, 127)
    } else {
        Color::Rgb(255, 69, 58)
    };

    let volume_text = match record.volume_24h {
        Some(v) => format_volume(v),
        None => "—".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {:<9}", record.symbol),
                Style::default()
                    .fg(Color::White)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{:>+9.2}% ", record.change), change_style),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" O:{:<9.4}", record.open),
                Style::default().fg(Color::Rgb(200, 200, 220)).bg(bg),
            ),
            Span::styled(
                format!("C:{:<8.4} ", record.close),
                Style::default().fg(close_color).bg(bg),
            ),
        ]),
        Line::from(vec![Span::styled(
            format!(" {:>19} ", volume_text),
            Style::default().fg(volume_color(volume)).bg(bg),
        )]),
    ];

    let mut style = Style::default().bg(bg);
    if matched {
        style = style.add_modifier(Modifier::REVERSED);
    }
    let paragraph = Paragraph::new(lines).style(style);
    f.render_widget(paragraph, area);
}

/// Countdown, active timeframe, search buffer and connectivity in one bar
fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let connected = app.session.is_connected();
    let (status, status_color) = if connected {
        ("connected", Color::Rgb(0, 255, 127))
    } else {
        ("disconnected", Color::Rgb(255, 69, 58))
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.session.countdown()),
            Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", app.session.timeframe()),
            Style::default().fg(Color::Rgb(100, 200, 255)),
        ),
        Span::styled(
            format!(" {status} "),
            Style::default().fg(status_color),
        ),
    ];
    if !app.search.is_empty() {
        spans.push(Span::styled(
            format!("  /{} ", app.search.as_str()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::REVERSED),
        ));
    }
    spans.push(Span::styled(
        "  [F1-F6] timeframe  [Esc] quit ",
        Style::default().fg(Color::Rgb(128, 128, 128)),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(117, 117, 117)))
        .style(Style::default().bg(BASE_BG));

    let footer = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Left);
    f.render_widget(footer, area);
}
