pub mod layout;
mod menu;
mod results;

pub use layout::{calculate_menu_chunks, calculate_results_chunks};
pub use menu::draw_menu;
pub use results::draw_results;

use crate::models::AppState;
use crate::session::App;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Menu => draw_menu(f, app),
        AppState::Running | AppState::Results => draw_results(f, app),
    }
}

fn key_hint(key: &str) -> Span<'_> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}
