use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct MenuLayout {
    pub header_area: Rect,
    pub files_area: Rect,
    pub settings_area: Rect,
    pub status_area: Rect,
    pub help_area: Rect,
}

pub struct ResultsLayout {
    pub header_area: Rect,
    pub progress_area: Rect,
    pub table_area: Rect,
    pub detail_area: Rect,
    pub help_area: Rect,
}

pub fn calculate_menu_chunks(area: Rect) -> MenuLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    MenuLayout {
        header_area: chunks[0],
        files_area: body[0],
        settings_area: body[1],
        status_area: chunks[2],
        help_area: chunks[3],
    }
}

pub fn calculate_results_chunks(area: Rect) -> ResultsLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(area);

    ResultsLayout {
        header_area: chunks[0],
        progress_area: chunks[1],
        table_area: chunks[2],
        detail_area: chunks[3],
        help_area: chunks[4],
    }
}
