use super::key_hint;
use super::layout::calculate_results_chunks;
use crate::models::AppState;
use crate::session::App;
use crate::utils::{confidence_bar, single_line, truncate_string};
use ratatui::{
    layout::{Alignment, Constraint},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

fn verdict_color(verdict: &str, success: bool) -> Color {
    if !success {
        Color::Red
    } else if verdict.eq_ignore_ascii_case("pass") {
        Color::Green
    } else if verdict.eq_ignore_ascii_case("fail") {
        Color::Yellow
    } else {
        Color::Gray
    }
}

pub fn draw_results(f: &mut Frame, app: &App) {
    let layout = calculate_results_chunks(f.area());
    let running = app.state == AppState::Running;

    let title_text = if running {
        "Evaluating...".to_string()
    } else {
        format!(
            "Results: {} passed of {}",
            app.results.passed(),
            app.results.len()
        )
    };
    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let (done, label) = match &app.progress {
        Some(p) => (p.index, format!("{}/{} {}", p.index, p.total, p.filename)),
        None => (0, format!("0/{}", app.batch_total)),
    };
    let ratio = if app.batch_total == 0 {
        1.0
    } else {
        (done as f64 / app.batch_total as f64).min(1.0)
    };
    let gauge = Gauge::default()
        .block(Block::default().title(" Progress ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(label);
    f.render_widget(gauge, layout.progress_area);

    let explanation_width = layout.table_area.width.saturating_sub(54) as usize;
    let rows: Vec<Row> = app
        .results
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(truncate_string(&r.document, 24)),
                Cell::from(r.verdict.clone())
                    .style(Style::default().fg(verdict_color(&r.verdict, r.success))),
                Cell::from(confidence_bar(r.confidence, 10)),
                Cell::from(truncate_string(&single_line(&r.explanation), explanation_width)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Document", "Verdict", "Confidence", "Explanation"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(17),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().title(" Evaluations ").borders(Borders::ALL))
    .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = TableState::default();
    if !running && !app.results.is_empty() {
        state.select(Some(app.result_cursor));
    }
    f.render_stateful_widget(table, layout.table_area, &mut state);

    let mut detail: Vec<Line> = Vec::new();
    if let Some(result) = app.results.get(app.result_cursor).filter(|_| !running) {
        detail.push(Line::from(Span::styled(
            result.document.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        detail.push(Line::from(single_line(&result.explanation)));
    }
    for skipped in &app.skipped {
        detail.push(Line::from(Span::styled(
            format!("Skipped {}: {}", skipped.name, skipped.reason),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(status) = &app.status {
        detail.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    let details = Paragraph::new(detail)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Details ").borders(Borders::ALL));
    f.render_widget(details, layout.detail_area);

    let help_line = if running {
        Line::from(vec![key_hint("Ctrl+C"), Span::raw(" quit")])
    } else {
        Line::from(vec![
            key_hint("j/k"),
            Span::raw(" browse  "),
            key_hint("x"),
            Span::raw(" export CSV  "),
            key_hint("r"),
            Span::raw(" re-run  "),
            key_hint("m"),
            Span::raw(" menu  "),
            key_hint("q"),
            Span::raw(" quit"),
        ])
    };
    let help = Paragraph::new(help_line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
