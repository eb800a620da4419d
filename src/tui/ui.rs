use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::widgets::{bank, quiz, sources};
use super::{App, PopupKind, View};

pub fn draw<R>(f: &mut Frame, app: &App<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);

    if app.popup.is_some() {
        draw_popup(f, app);
    }
}

fn draw_tabs<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let tab_titles = vec!["Sources", "Quiz", "Bank"];
    let selected = match app.view {
        View::Sources => 0,
        View::Quiz => 1,
        View::Bank => 2,
    };

    let title = format!(" Quizdesk | Score: {} ", app.session.score());
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    match app.view {
        View::Sources => sources::draw(f, app, area),
        View::Quiz => quiz::draw(f, app, area),
        View::Bank => bank::draw(f, app, area),
    }
}

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().fg(Color::Cyan))
}

fn draw_help_bar<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let mut spans = if app.popup.is_some() {
        vec![key("any key"), Span::raw(" Dismiss  ")]
    } else {
        let mut spans = vec![key("h/l"), Span::raw(" Views  ")];
        match app.view {
            View::Sources => spans.extend(vec![
                key("j/k"),
                Span::raw(" Nav  "),
                key("<CR>"),
                Span::raw(" Start  "),
                key("^r"),
                Span::raw(" Refresh  "),
            ]),
            View::Quiz => spans.extend(vec![
                key("1-4"),
                Span::raw(" Answer  "),
                key("j/k <CR>"),
                Span::raw(" Pick  "),
                key("n"),
                Span::raw(" Next  "),
                key("x"),
                Span::raw(" Abandon  "),
            ]),
            View::Bank => spans.extend(vec![key("^r"), Span::raw(" Refresh  ")]),
        }
        spans
    };
    spans.extend(vec![key("q"), Span::raw(" Quit")]);

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}

fn draw_popup<R>(f: &mut Frame, app: &App<R>) {
    let popup = match &app.popup {
        Some(p) => p,
        None => return,
    };

    let color = match popup.kind {
        PopupKind::Info => Color::Green,
        PopupKind::Warning => Color::Yellow,
        PopupKind::Error => Color::Red,
    };

    let area = centered_rect(50, 30, f.area());
    let body = Paragraph::new(popup.message.as_str())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", popup.title))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );

    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
