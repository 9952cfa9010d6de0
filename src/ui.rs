//! The UI renders the application state into something visible and reviewable.
//!
//! The draw function dispatches based on the current view (file list or document). The document
//! view shows numbered lines with marked lines on a highlighted background, the selection in
//! progress in a second colour and the cursor line reversed.

use crate::app_state::{AppState, FileMode, View, Viewport};
use crate::config::Config;
use crate::document::Document;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::str::FromStr;

const FALLBACK_HIGHLIGHT: Color = Color::Rgb(31, 77, 31);

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut AppState, cfg: &Config) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    match app.current_view {
        View::FileList => draw_file_list(f, app, chunks[0]),
        View::Document | View::Command => draw_document(f, app, cfg, chunks[0]),
    }
    draw_status(f, app, chunks[1]);
}

fn highlight_color(cfg: &Config) -> Color {
    Color::from_str(&cfg.highlight_color).unwrap_or(FALLBACK_HIGHLIGHT)
}

fn draw_file_list(f: &mut Frame, app: &AppState, area: Rect) {
    let items: Vec<ListItem> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let marked = app.marked_lines(i);
            let name = app
                .session
                .key_for(path)
                .unwrap_or_else(|_| path.display().to_string());
            let badge = if marked == 0 {
                Span::styled("  unreviewed", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(
                    format!("  {marked} marked line(s)"),
                    Style::default().fg(Color::Green),
                )
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("📄 {name}"),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                ),
                badge,
            ]))
        })
        .collect();

    let title = format!("Files ({})", app.files.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(Some(app.current_file_index));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_document(f: &mut Frame, app: &mut AppState, cfg: &Config, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    app.scroll_into_view(usize::from(inner.height));

    let Some(viewport) = app.viewport.as_ref() else {
        f.render_widget(block.title("No document"), area);
        return;
    };

    let title = format!(
        "{} ({} lines, {} highlighted)",
        viewport.key,
        viewport.document.line_count(),
        viewport.highlights.len()
    );
    let lines = document_lines(app, viewport, highlight_color(cfg), usize::from(inner.height));

    f.render_widget(Paragraph::new(lines).block(block.title(title)), area);
}

fn document_lines(
    app: &AppState,
    viewport: &Viewport,
    marked_bg: Color,
    height: usize,
) -> Vec<Line<'static>> {
    let gutter_width = viewport.document.line_count().to_string().len();

    viewport
        .document
        .lines()
        .enumerate()
        .skip(app.scroll)
        .take(height)
        .map(|(number, text)| {
            let mut style = Style::default();
            if viewport.is_marked(number) {
                style = style.bg(marked_bg);
            }
            if app.is_selected(number) {
                style = style.bg(Color::Rgb(60, 60, 110));
            }
            if number == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let gutter = Span::styled(
                format!("{:>gutter_width$} ", number + 1),
                Style::default().fg(Color::DarkGray),
            );
            Line::from(vec![gutter, Span::raw(text.to_string())]).style(style)
        })
        .collect()
}

fn draw_status(f: &mut Frame, app: &AppState, area: Rect) {
    let text = if app.current_view == View::Command {
        format!(":{}", app.command_buffer)
    } else if let Some(ref msg) = app.message {
        msg.clone()
    } else {
        match (&app.current_view, &app.file_mode) {
            (View::FileList, _) => "↑/↓: Navigate | Enter: Open | q: Quit".to_string(),
            (_, FileMode::Multi) => {
                "v: Select | m/u: Mark/Unmark | M/U: Whole file | r: Reload | : Command | q: Files"
                    .to_string()
            }
            (_, FileMode::Single) => {
                "v: Select | m/u: Mark/Unmark | M/U: Whole file | r: Reload | : Command | q: Quit"
                    .to_string()
            }
        }
    };

    let title = if app.current_view == View::Command {
        "Command"
    } else {
        ""
    };
    let status = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(status, area);
}

#[cfg(test)]
#[path = "tests/ui.rs"]
mod tests;
