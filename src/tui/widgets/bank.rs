use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::tui::App;

pub fn draw<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_tables(f, app, chunks[0]);
    draw_session(f, app, chunks[1]);
}

fn draw_tables<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let items: Vec<ListItem> = if app.tables.is_empty() {
        vec![ListItem::new(Span::styled(
            "Nothing ingested yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.tables
            .iter()
            .map(|table| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<30}", table.name),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>6}", table.question_count),
                        Style::default().fg(Color::Green),
                    ),
                ]))
            })
            .collect()
    };

    let total: i64 = app.tables.iter().map(|t| t.question_count).sum();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Question Bank ({} questions) ", total))
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(List::new(items).block(block), area);
}

fn draw_session<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let session = &app.session;
    let progress = if session.total() == 0 {
        "-".to_string()
    } else {
        let answered = (session.current_index() + 1).clamp(0, session.total() as isize);
        format!("{}/{}", answered, session.total())
    };

    let row = |label: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::styled(value, Style::default().fg(color)),
        ])
    };

    let text = vec![
        row("State: ", session.state().label().to_string(), Color::Yellow),
        row(
            "Source: ",
            session.source_name().unwrap_or("-").to_string(),
            Color::White,
        ),
        row("Progress: ", progress, Color::Cyan),
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Gray)),
            Span::styled(
                session.score().to_string(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Session ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), area);
}
