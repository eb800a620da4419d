use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::truncate;
use crate::tui::App;

pub fn draw<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Sources ({}) ", app.session.sources_dir().display()))
        .title_style(Style::default().fg(Color::Cyan));

    if app.sources.items.is_empty() {
        let hint = Paragraph::new("No .txt question files found. Add some and press ^r.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = app
        .sources
        .items
        .iter()
        .map(|source| {
            let (status, color) = match app.question_count(&source.table_name) {
                Some(n) => (format!("{} questions", n), Color::Green),
                None => ("not ingested".to_string(), Color::DarkGray),
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<40}", truncate(&source.file_name, 38)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<24}", source.table_name),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(status, Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.sources.selected);

    f.render_stateful_widget(list, area, &mut state);
}
