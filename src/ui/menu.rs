use super::key_hint;
use super::layout::calculate_menu_chunks;
use crate::documents::display_name;
use crate::session::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

fn file_marker(app: &App, index: usize) -> &'static str {
    if app.golden == Some(index) {
        "[G]"
    } else if app.selected.contains(&index) {
        "[x]"
    } else {
        "[ ]"
    }
}

fn draw_files(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Documents in {} ({} selected) ",
        app.documents_dir.display(),
        app.selected.len()
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if app.files.is_empty() {
        let empty = Paragraph::new("No .md or .txt files found. Add some and press 'r'.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let style = if app.golden == Some(i) {
                Style::default().fg(Color::Yellow)
            } else if app.selected.contains(&i) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {}", file_marker(app, i), display_name(path))).style(style)
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

    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_settings(f: &mut Frame, app: &App, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let provider = app.current_provider();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Provider     ", label),
            Span::raw(provider.display_name()),
        ]),
        Line::from(vec![
            Span::styled("Model        ", label),
            Span::raw(app.current_model()),
        ]),
        Line::from(vec![
            Span::styled("Temperature  ", label),
            Span::raw(format!("{:.1}", app.current_temperature())),
        ]),
        Line::from(vec![
            Span::styled("Max tokens   ", label),
            Span::raw(app.current_max_tokens().to_string()),
        ]),
        Line::from(""),
    ];

    match &app.config {
        Ok(_) => lines.push(Line::from(Span::styled(
            "Ready",
            Style::default().fg(Color::Green),
        ))),
        Err(e) => lines.push(Line::from(Span::styled(
            e.as_str(),
            Style::default().fg(Color::Red),
        ))),
    }

    if let Some(golden) = app.golden.and_then(|i| app.files.get(i)) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Golden       ", label),
            Span::raw(display_name(golden)),
        ]));
    }

    let settings = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Settings ").borders(Borders::ALL));
    f.render_widget(settings, area);
}

pub fn draw_menu(f: &mut Frame, app: &App) {
    let layout = calculate_menu_chunks(f.area());

    let title = Paragraph::new("Document Evaluator")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    draw_files(f, app, layout.files_area);
    draw_settings(f, app, layout.settings_area);

    let status_style = if app.config.is_err() {
        Style::default().fg(Color::Red)
    } else if app.can_start() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status_text = app.status.clone().unwrap_or_else(|| {
        if app.can_start() {
            "Press Enter to evaluate".to_string()
        } else {
            "Mark a golden standard and select documents".to_string()
        }
    });
    let status = Paragraph::new(status_text)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, layout.status_area);

    let help = Paragraph::new(Line::from(vec![
        key_hint("g"),
        Span::raw(" golden  "),
        key_hint("Space"),
        Span::raw(" select  "),
        key_hint("a"),
        Span::raw(" all  "),
        key_hint("p/m"),
        Span::raw(" provider/model  "),
        key_hint("+/-"),
        Span::raw(" temp  "),
        key_hint("[/]"),
        Span::raw(" tokens  "),
        key_hint("r"),
        Span::raw(" rescan  "),
        key_hint("Enter"),
        Span::raw(" evaluate  "),
        key_hint("q"),
        Span::raw(" quit"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
