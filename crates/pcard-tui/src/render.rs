//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame` and never
//! mutate state or return effects. What to draw comes from
//! [`ProfileView`]; this module only lays it out.

use pcard_core::view::{ProfileCard, ProfileView};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::text::{truncate_middle, truncate_with_ellipsis};
use crate::state::{AppState, StatusLevel};

const CARD_WIDTH: u16 = 56;
const LOGIN_HEIGHT: u16 = 9;
const STATUS_HEIGHT: u16 = 1;
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Renders the entire screen.
pub fn render(app: &AppState, frame: &mut Frame) {
    let [main, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)])
            .areas(frame.area());

    match app.view() {
        ProfileView::SignedOut { login_label } => render_login(app, login_label, frame, main),
        ProfileView::SignedIn(card) => render_card(app, &card, frame, main),
    }
    render_status_line(app, frame, status);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_login(app: &AppState, login_label: &str, frame: &mut Frame, area: Rect) {
    let popup = centered(area, CARD_WIDTH, LOGIN_HEIGHT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" pcard ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = vec![Line::from("")];
    if let Some(url) = &app.pending_login {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        lines.push(Line::from(Span::styled(
            format!("{spinner} Waiting for browser login..."),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(Span::styled(
            truncate_middle(url, inner.width.saturating_sub(2) as usize),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
        lines.push(hint_line("Esc to cancel"));
    } else {
        lines.push(Line::from(Span::styled(
            format!("[ {login_label} ]"),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(hint_line("Enter to sign in, q to quit"));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_card(app: &AppState, card: &ProfileCard, frame: &mut Frame, area: Rect) {
    // Title row, picture row, blank, one row per field, blank, hint, borders.
    let height = card.fields.len() as u16 + 7;
    let popup = centered(area, CARD_WIDTH, height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" {} ", card.heading));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let label_width = card
        .fields
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    let value_width = (inner.width as usize).saturating_sub(label_width + 3);

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(&card.title, inner.width.saturating_sub(1) as usize),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_middle(&card.picture, inner.width.saturating_sub(1) as usize),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    for field in &card.fields {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<label_width$}  ", field.label),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(truncate_with_ellipsis(&field.value, value_width)),
        ]));
    }
    lines.push(Line::from(""));

    let refreshing = if app.is_refreshing() {
        "refreshing... "
    } else {
        ""
    };
    lines.push(hint_line(&format!(
        "{refreshing}o: {}  r: refresh  q: quit",
        card.logout_label
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_line(app: &AppState, frame: &mut Frame, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.level {
        StatusLevel::Info => Color::Green,
        StatusLevel::Error => Color::Red,
    };
    let text = truncate_with_ellipsis(&status.text, area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(color))),
        area,
    );
}

fn hint_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}
