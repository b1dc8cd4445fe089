use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tododash_core::controller::FetchTicket;
use tododash_core::{
    Config, Dashboard, DialogMode, Notice, StatusFilter, Task, TaskDraft, TaskForm, TaskId,
    TaskPage, TodoApi,
};
use tracing::debug;

/// Cards per row of the grid.
pub const GRID_COLUMNS: usize = 3;
const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Hero,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Results of background API calls, delivered back to the event loop.
pub enum Msg {
    Listed {
        seq: u64,
        result: tododash_core::Result<TaskPage>,
    },
    Created(tododash_core::Result<Task>),
    Updated(tododash_core::Result<Task>),
    Deleted(tododash_core::Result<()>),
}

pub struct Toast {
    pub notice: Notice,
    pub shown_at: Instant,
}

enum FormAction {
    Submit,
    Cancel,
    Edited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Moves a card selection around a grid of `len` cards.
pub fn move_selection(selected: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }
    let selected = selected.min(len - 1);
    match direction {
        Direction::Left => selected.saturating_sub(1),
        Direction::Right => (selected + 1).min(len - 1),
        Direction::Up => selected.checked_sub(GRID_COLUMNS).unwrap_or(selected),
        Direction::Down => {
            if selected + GRID_COLUMNS < len {
                selected + GRID_COLUMNS
            } else {
                selected
            }
        }
    }
}

pub struct App {
    api: Arc<dyn TodoApi>,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
    pub dashboard: Dashboard,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub selected: usize,
    pub toasts: Vec<Toast>,
    pub base_url: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(api: Arc<dyn TodoApi>, config: &Config) -> App {
        let (tx, rx) = mpsc::unbounded_channel();
        App {
            api,
            tx,
            rx,
            dashboard: Dashboard::new(config.page_limit),
            screen: Screen::Hero,
            input_mode: InputMode::Normal,
            selected: 0,
            toasts: Vec::new(),
            base_url: config.base_url.clone(),
            should_quit: false,
        }
    }

    /// Initial load, as on mount.
    pub fn start(&mut self) {
        let ticket = self.dashboard.begin_reload();
        self.spawn_fetch(ticket);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.dashboard.list_state().items.get(self.selected)
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_tasks(&ticket.query).await;
            let _ = tx.send(Msg::Listed {
                seq: ticket.seq,
                result,
            });
        });
    }

    fn spawn_create(&self, draft: TaskDraft) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Msg::Created(api.create_task(&draft).await));
        });
    }

    fn spawn_update(&self, id: TaskId, draft: TaskDraft) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Msg::Updated(api.update_task(&id, &draft).await));
        });
    }

    fn spawn_delete(&self, id: TaskId) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Msg::Deleted(api.delete_task(&id).await));
        });
    }

    fn fetch_if(&mut self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
    }

    /// Applies every finished API call.
    pub fn pump(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: Msg) {
        match msg {
            Msg::Listed { seq, result } => {
                if self.dashboard.finish_reload(seq, result) {
                    let len = self.dashboard.list_state().items.len();
                    self.selected = self.selected.min(len.saturating_sub(1));
                }
            }
            Msg::Created(result) => {
                let ticket = self.dashboard.finish_create(result);
                self.fetch_if(ticket);
            }
            Msg::Updated(result) => {
                let ticket = self.dashboard.finish_update(result);
                self.fetch_if(ticket);
            }
            Msg::Deleted(result) => {
                let ticket = self.dashboard.finish_delete(result);
                self.fetch_if(ticket);
            }
        }
    }

    /// Moves new notices into toasts and expires old ones.
    pub fn tick(&mut self, now: Instant) {
        for notice in self.dashboard.notices.drain() {
            self.toasts.push(Toast {
                notice,
                shown_at: now,
            });
        }
        self.toasts
            .retain(|t| now.duration_since(t.shown_at) < TOAST_TTL);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.screen == Screen::Hero {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Enter | KeyCode::Char(' ') => self.screen = Screen::Dashboard,
                _ => {}
            }
            return;
        }

        if self.dashboard.view.is_confirming_delete() {
            self.on_confirm_key(key);
        } else if self.dashboard.view.is_open() {
            self.on_view_key(key);
        } else if self.dashboard.create.is_open() {
            self.on_create_key(key);
        } else if self.input_mode == InputMode::Search {
            self.on_search_key(key);
        } else {
            self.on_normal_key(key);
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        let len = self.dashboard.list_state().items.len();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected = move_selection(self.selected, len, Direction::Left)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected = move_selection(self.selected, len, Direction::Right)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = move_selection(self.selected, len, Direction::Up)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = move_selection(self.selected, len, Direction::Down)
            }
            KeyCode::Enter => {
                if let Some(task) = self.selected_task().cloned() {
                    self.dashboard.open_task(task);
                }
            }
            KeyCode::Char('c') | KeyCode::Char('a') => self.dashboard.create.open(),
            KeyCode::Tab | KeyCode::Char('f') => {
                let next = self.dashboard.list_state().status.next();
                self.change_filter(next);
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.change_filter(StatusFilter::CHOICES[idx]);
            }
            KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => {
                let page = self.dashboard.list_state().page + 1;
                self.change_page(page);
            }
            KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => {
                let page = self.dashboard.list_state().page.saturating_sub(1);
                self.change_page(page);
            }
            KeyCode::Char('r') => {
                let ticket = self.dashboard.begin_reload();
                self.spawn_fetch(ticket);
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('H') => self.screen = Screen::Hero,
            _ => {}
        }
    }

    pub fn change_page(&mut self, page: u32) {
        let ticket = self.dashboard.change_page(page);
        if ticket.is_some() {
            self.selected = 0;
        }
        self.fetch_if(ticket);
    }

    pub fn change_filter(&mut self, status: StatusFilter) {
        debug!(?status, "filter change");
        let ticket = self.dashboard.change_status_filter(status);
        if ticket.is_some() {
            self.selected = 0;
        }
        self.fetch_if(ticket);
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let mut search = self.dashboard.list_state().search.clone();
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                return;
            }
            KeyCode::Char(c) => search.push(c),
            KeyCode::Backspace => {
                search.pop();
            }
            _ => return,
        }
        self.dashboard.set_search(search);
    }

    fn on_create_key(&mut self, key: KeyEvent) {
        if self.dashboard.create.is_submitting() {
            return;
        }
        match edit_form(&mut self.dashboard.create.form, key) {
            FormAction::Cancel => self.dashboard.create.close(),
            FormAction::Submit => {
                if let Some(draft) = self.dashboard.prepare_create() {
                    self.spawn_create(draft);
                }
            }
            FormAction::Edited => {}
        }
    }

    fn on_view_key(&mut self, key: KeyEvent) {
        let Some((mode, busy)) = self.dashboard.view.current().map(|o| (o.mode, o.busy)) else {
            return;
        };
        if busy {
            return;
        }
        match mode {
            DialogMode::Viewing => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.dashboard.close_view(),
                KeyCode::Char('e') => {
                    self.dashboard.begin_edit();
                }
                KeyCode::Char('d') | KeyCode::Delete => {
                    self.dashboard.request_delete();
                }
                _ => {}
            },
            DialogMode::Editing => {
                let action = match self.dashboard.view.edit_form_mut() {
                    Some(form) => edit_form(form, key),
                    None => return,
                };
                match action {
                    FormAction::Cancel => self.dashboard.cancel_edit(),
                    FormAction::Submit => {
                        if let Some((id, draft)) = self.dashboard.prepare_update() {
                            self.spawn_update(id, draft);
                        }
                    }
                    FormAction::Edited => {}
                }
            }
        }
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        if let Some(id) = self.dashboard.confirm_delete(confirmed) {
            self.spawn_delete(id);
        }
    }
}

fn edit_form(form: &mut TaskForm, key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => return FormAction::Submit,
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
        KeyCode::Left => form.move_left(),
        KeyCode::Right => form.move_right(),
        KeyCode::Backspace => form.delete_char(),
        KeyCode::Char(c) => form.input_char(c),
        _ => {}
    }
    FormAction::Edited
}
