use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::OptionClass;
use crate::session::{Prompt, SessionState, SessionSummary};
use crate::tui::App;

pub fn draw<R>(f: &mut Frame, app: &App<R>, area: Rect) {
    match app.session.current_prompt() {
        Some(prompt) => draw_prompt(f, app, prompt, area),
        None => match &app.last_summary {
            Some(summary) if app.session.state() == SessionState::Complete => {
                draw_summary(f, summary, area)
            }
            _ => draw_idle(f, area),
        },
    }
}

fn draw_prompt<R>(f: &mut Frame, app: &App<R>, prompt: &Prompt, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Question
            Constraint::Min(6),    // Options
            Constraint::Length(3), // Result line
        ])
        .split(area);

    let title = format!(
        " Question {}/{} | Source: {} ",
        prompt.number, prompt.total, prompt.source
    );
    let question = Paragraph::new(prompt.question.as_str())
        .wrap(Wrap { trim: true })
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(question, chunks[0]);

    let mut lines: Vec<Line> = Vec::with_capacity(prompt.options.len() * 2);
    for (index, (_, text)) in prompt.options.iter().enumerate() {
        let class = app.feedback.as_ref().map(|fb| fb.classes[index]);
        let style = match class {
            Some(OptionClass::Correct) => Style::default().fg(Color::Black).bg(Color::Green),
            Some(OptionClass::WrongSelected) => Style::default().fg(Color::White).bg(Color::Red),
            Some(OptionClass::Neutral) => Style::default().fg(Color::Gray),
            None if index == app.cursor => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            None => Style::default().fg(Color::Gray),
        };
        let marker = if class.is_none() && index == app.cursor { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", index + 1), style),
            Span::styled(text.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }
    let options = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Options "));
    f.render_widget(options, chunks[1]);

    let result = match &app.feedback {
        Some(fb) if fb.is_correct => Line::from(vec![
            Span::styled("Correct! ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Press n for the next question."),
        ]),
        Some(fb) => Line::from(vec![
            Span::styled("Wrong. ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(format!("Answer: {}. Press n for the next question.", fb.correct_text)),
        ]),
        None => Line::from(Span::styled(
            "Pick an answer with 1-4, or press n to skip.",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(
        Paragraph::new(result).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
}

fn draw_summary(f: &mut Frame, summary: &SessionSummary, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "All questions completed!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Source: ", Style::default().fg(Color::Gray)),
            Span::styled(summary.source_name.as_str(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{} ({:.0}%)", summary.score, summary.total, summary.percent()),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Time: ", Style::default().fg(Color::Gray)),
            Span::styled(summary.elapsed_label(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Go to Sources and press <CR> to play again.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_idle(f: &mut Frame, area: Rect) {
    let hint = Paragraph::new("No quiz running. Pick a source on the Sources tab.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Quiz "));
    f.render_widget(hint, area);
}
