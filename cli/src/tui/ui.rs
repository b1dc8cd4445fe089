use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tododash_core::time::{format_date, format_deadline};
use tododash_core::{
    task_badge, BadgeKind, DialogMode, FormField, NoticeLevel, StatusFilter, Task, TaskForm,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::app::{App, InputMode, Screen, GRID_COLUMNS};

const CARD_HEIGHT: u16 = 9;

pub fn draw(f: &mut Frame, app: &mut App) {
    let now = Utc::now();
    match app.screen {
        Screen::Hero => draw_hero(f, app),
        Screen::Dashboard => {
            draw_dashboard(f, app, now);
            if app.dashboard.create.is_open() {
                draw_create_modal(f, app);
            }
            if app.dashboard.view.is_open() {
                draw_view_modal(f, app, now);
            }
        }
    }
    draw_toasts(f, app);
}

fn badge_color(kind: BadgeKind) -> Color {
    match kind {
        BadgeKind::Overdue => Color::Red,
        BadgeKind::Completed => Color::Green,
        BadgeKind::InProgress => Color::Blue,
        BadgeKind::Pending => Color::Yellow,
    }
}

/// Cuts `text` to at most `max_width` terminal cells, ending with an ellipsis.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn draw_hero(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, f.area());
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TODODASH",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Organize your tasks, track deadlines and never miss what matters."),
        Line::from(""),
        Line::from("• Create, edit and delete tasks"),
        Line::from("• Filter by status and page through results"),
        Line::from("• Overdue deadlines flagged as time passes"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connected to {}", app.base_url),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::raw(" Get Started    "),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ]),
    ];
    let hero = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(hero, area);
}

fn draw_dashboard(f: &mut Frame, app: &App, now: DateTime<Utc>) {
    let state = app.dashboard.list_state();
    let pagination_height = if state.total_pages > 1 { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                 // Header
            Constraint::Length(3),                 // Filters
            Constraint::Min(1),                    // Cards
            Constraint::Length(pagination_height), // Pagination
            Constraint::Length(1),                 // Help
        ])
        .split(f.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Task Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  Manage your tasks and stay productive   ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("[c] Create Task", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(header, chunks[0]);

    draw_filter_bar(f, app, chunks[1]);
    draw_cards(f, app, chunks[2], now);
    if pagination_height > 0 {
        draw_pagination(f, app, chunks[3]);
    }

    let help = match app.input_mode {
        InputMode::Search => "type to search | Enter/Esc: done",
        InputMode::Normal => {
            "arrows/hjkl: move | Enter: open | c: create | f/1-4: filter | [/]: page | r: reload | /: search | q: quit"
        }
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[4]);
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let state = app.dashboard.list_state();
    let mut spans = vec![Span::raw(" Status: ")];
    for (i, choice) in StatusFilter::CHOICES.iter().enumerate() {
        let style = if *choice == state.status {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, choice.label()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("  Search: "));
    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search = if state.search.is_empty() && app.input_mode == InputMode::Normal {
        "Search tasks...".to_string()
    } else {
        state.search.clone()
    };
    spans.push(Span::styled(search, search_style));

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(bar, area);
}

fn draw_cards(f: &mut Frame, app: &App, area: Rect, now: DateTime<Utc>) {
    let state = app.dashboard.list_state();
    let title = if state.loading {
        " Tasks (loading...) "
    } else {
        " Tasks "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.items.is_empty() {
        let message = if state.loading {
            "Loading tasks..."
        } else {
            "No tasks found. Press [c] to create one."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(empty, inner);
        return;
    }

    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.selected / GRID_COLUMNS;
    let first_row = selected_row.saturating_sub(visible_rows - 1);
    let row_count = state.items.len().div_ceil(GRID_COLUMNS);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(inner);

    for (slot, row) in (first_row..row_count).take(visible_rows).enumerate() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(rows[slot]);
        for col in 0..GRID_COLUMNS {
            let index = row * GRID_COLUMNS + col;
            if let Some(task) = state.items.get(index) {
                draw_card(f, task, columns[col], index == app.selected, now);
            }
        }
    }
}

fn draw_card(f: &mut Frame, task: &Task, area: Rect, selected: bool, now: DateTime<Utc>) {
    let badge = task_badge(task, now);
    let color = badge_color(badge.kind);
    let width = area.width.saturating_sub(2) as usize;

    let mut border_style = Style::default().fg(color);
    if selected {
        border_style = border_style.add_modifier(Modifier::BOLD);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border_style);

    let mut lines = vec![
        Line::from(Span::styled(
            truncate(&task.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&task.description, width),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!(" {} ", badge.label),
            Style::default().fg(Color::Black).bg(color),
        )),
        Line::from(Span::styled(
            truncate(&format_deadline(task.deadline), width),
            Style::default().fg(if badge.kind == BadgeKind::Overdue {
                Color::Red
            } else {
                Color::White
            }),
        )),
    ];
    if badge.kind == BadgeKind::Overdue {
        lines.push(Line::from(Span::styled(
            "OVERDUE - NEEDS ATTENTION",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("Created {}", format_date(task.created_at)),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_pagination(f: &mut Frame, app: &App, area: Rect) {
    let state = app.dashboard.list_state();
    let nav = |enabled: bool| {
        if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let mut spans = vec![
        Span::raw(format!(
            " Page {} of {} • {} total tasks    ",
            state.page, state.total_pages, state.total
        )),
        Span::styled("‹ Prev ", nav(state.has_previous())),
    ];
    for page in state.window() {
        if page == state.page {
            spans.push(Span::styled(
                format!("[{}]", page),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(format!(" {} ", page)));
        }
    }
    spans.push(Span::styled(" Next ›", nav(state.has_next())));

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(bar, area);
}

fn draw_form(f: &mut Frame, form: &TaskForm, area: Rect, busy: bool) {
    let mut lines = Vec::new();
    let mut cursor = None;

    for field in FormField::ALL {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Blue)
        };
        lines.push(Line::from(Span::styled(format!("{} *", field.label()), label_style)));

        let value = match form.text(field) {
            Some(text) => {
                if focused {
                    let before: String = text.chars().take(form.cursor).collect();
                    cursor = Some((lines.len() as u16, before.width() as u16 + 2));
                }
                if text.is_empty() && field == FormField::Deadline {
                    Span::styled(
                        "  YYYY-MM-DDTHH:MM, tomorrow, +3d, fri",
                        Style::default().fg(Color::DarkGray),
                    )
                } else {
                    Span::raw(format!("  {}", text))
                }
            }
            None => Span::styled(
                format!("  ‹ {} ›", form.status.label()),
                Style::default().fg(Color::Cyan),
            ),
        };
        lines.push(Line::from(value));
        lines.push(Line::from(""));
    }

    let hint = if busy {
        "Saving..."
    } else {
        "Tab: next field | ←/→: status | Enter: save | Esc: cancel"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

    f.render_widget(Paragraph::new(lines), area);

    if let (Some((row, col)), false) = (cursor, busy) {
        let x = (area.x + col).min(area.right().saturating_sub(1));
        f.set_cursor_position((x, area.y + row));
    }
}

fn modal_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
}

fn draw_create_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    let block = modal_block(" Create New Task ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    draw_form(
        f,
        &app.dashboard.create.form,
        inner,
        app.dashboard.create.is_submitting(),
    );
}

fn draw_view_modal(f: &mut Frame, app: &App, now: DateTime<Utc>) {
    let Some(open) = app.dashboard.view.current() else {
        return;
    };
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    match open.mode {
        DialogMode::Editing => {
            let block = modal_block(" Edit Task ");
            let inner = block.inner(area);
            f.render_widget(block, area);
            draw_form(f, &open.form, inner, open.busy);
        }
        DialogMode::Viewing => {
            let task = &open.task;
            let badge = task_badge(task, now);
            let color = badge_color(badge.kind);
            let mut lines = vec![
                Line::from(Span::styled(
                    task.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!(" {} ", badge.label),
                    Style::default().fg(Color::Black).bg(color),
                )),
                Line::from(""),
                Line::from(Span::styled("Description", Style::default().fg(Color::Blue))),
                Line::from(task.description.as_str()),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Deadline: ", Style::default().fg(Color::Blue)),
                    Span::raw(format_deadline(task.deadline)),
                ]),
                Line::from(vec![
                    Span::styled("Created:  ", Style::default().fg(Color::Blue)),
                    Span::raw(format_date(task.created_at)),
                ]),
                Line::from(vec![
                    Span::styled("Updated:  ", Style::default().fg(Color::Blue)),
                    Span::raw(format_date(task.updated_at)),
                ]),
                Line::from(vec![
                    Span::styled("ID:       ", Style::default().fg(Color::DarkGray)),
                    Span::raw(task.id.to_string()),
                ]),
                Line::from(""),
            ];
            if open.confirming_delete {
                lines.push(Line::from(Span::styled(
                    "Are you sure you want to delete this todo? (y/n)",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
            } else if open.busy {
                lines.push(Line::from(Span::styled(
                    "Deleting...",
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    "e: edit | d: delete | Esc: close",
                    Style::default().fg(Color::DarkGray),
                )));
            }

            let view = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(modal_block(" Task Details "));
            f.render_widget(view, area);
        }
    }
}

fn draw_toasts(f: &mut Frame, app: &App) {
    let screen = f.area();
    let width = 44.min(screen.width);
    let mut y = screen.y + 1;
    for toast in app.toasts.iter().rev() {
        if y + 3 > screen.bottom() {
            break;
        }
        let color = match toast.notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        let area = Rect::new(screen.right().saturating_sub(width + 1), y, width, 3);
        f.render_widget(Clear, area);
        let toast = Paragraph::new(truncate(
            &toast.notice.message,
            width.saturating_sub(2) as usize,
        ))
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(toast, area);
        y += 3;
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
