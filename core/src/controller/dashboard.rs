//! The task dashboard: list, create dialog and view/edit dialog wired to the
//! API, with notices as the only side-effect sink.
//!
//! Each operation comes in two shapes. The `prepare_*` / `finish_*` pairs do no
//! I/O, so a UI can run the API call in the background and hand the result
//! back. The async methods run the whole round trip against a [`TodoApi`].
//! Every successful mutation is followed by a fresh fetch of the current
//! `(page, status)`; nothing is spliced into the list locally.

use tracing::{info, warn};

use crate::api::TodoApi;
use crate::controller::dialog::{CreateDialog, ViewDialog};
use crate::controller::list::{FetchTicket, ListState, TodoListController};
use crate::error::Error;
use crate::model::page::{StatusFilter, TaskPage};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::notice::Notices;
use crate::Result;

pub const CREATED_MESSAGE: &str = "Todo created successfully";
pub const UPDATED_MESSAGE: &str = "Todo updated successfully";
pub const DELETED_MESSAGE: &str = "Todo deleted successfully";
pub const MISSING_ID_MESSAGE: &str = "Cannot delete: No ID found";

#[derive(Debug, Default)]
pub struct Dashboard {
    pub list: TodoListController,
    pub create: CreateDialog,
    pub view: ViewDialog,
    pub notices: Notices,
}

impl Dashboard {
    pub fn new(page_limit: u32) -> Self {
        Self {
            list: TodoListController::new(page_limit),
            create: CreateDialog::new(),
            view: ViewDialog::new(),
            notices: Notices::new(),
        }
    }

    pub fn list_state(&self) -> &ListState {
        self.list.state()
    }

    // List

    pub fn begin_reload(&mut self) -> FetchTicket {
        self.list.begin_fetch()
    }

    pub fn finish_reload(&mut self, seq: u64, result: Result<TaskPage>) -> bool {
        self.list.finish_fetch(seq, result, &mut self.notices)
    }

    pub async fn reload<A: TodoApi + ?Sized>(&mut self, api: &A) {
        let ticket = self.begin_reload();
        self.run_fetch(api, ticket).await;
    }

    pub async fn run_fetch<A: TodoApi + ?Sized>(&mut self, api: &A, ticket: FetchTicket) {
        let result = api.list_tasks(&ticket.query).await;
        self.finish_reload(ticket.seq, result);
    }

    pub fn change_page(&mut self, page: u32) -> Option<FetchTicket> {
        self.list.request_page(page)
    }

    pub fn change_status_filter(&mut self, status: StatusFilter) -> Option<FetchTicket> {
        self.list.set_status_filter(status)
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.list.set_search(search);
    }

    pub async fn go_to_page<A: TodoApi + ?Sized>(&mut self, api: &A, page: u32) {
        if let Some(ticket) = self.change_page(page) {
            self.run_fetch(api, ticket).await;
        }
    }

    pub async fn filter_by<A: TodoApi + ?Sized>(&mut self, api: &A, status: StatusFilter) {
        if let Some(ticket) = self.change_status_filter(status) {
            self.run_fetch(api, ticket).await;
        }
    }

    // Create

    /// Validated draft, or `None` after notifying why it was rejected.
    pub fn prepare_create(&mut self) -> Option<TaskDraft> {
        match self.create.prepare_submit() {
            Ok(draft) => Some(draft),
            Err(err) => {
                self.notices.error(err.submit_message());
                None
            }
        }
    }

    pub fn finish_create(&mut self, result: Result<Task>) -> Option<FetchTicket> {
        match result {
            Ok(task) => {
                info!(id = %task.id, "todo created");
                self.create.finish_submit(true);
                self.notices.success(CREATED_MESSAGE);
                Some(self.begin_reload())
            }
            Err(err) => {
                warn!(error = %err, "create failed");
                self.create.finish_submit(false);
                self.notices.error(err.submit_message());
                None
            }
        }
    }

    pub async fn submit_create<A: TodoApi + ?Sized>(&mut self, api: &A) {
        let Some(draft) = self.prepare_create() else {
            return;
        };
        let result = api.create_task(&draft).await;
        if let Some(ticket) = self.finish_create(result) {
            self.run_fetch(api, ticket).await;
        }
    }

    // View / edit

    pub fn open_task(&mut self, task: Task) {
        self.view.open(task);
    }

    pub fn close_view(&mut self) {
        self.view.close();
    }

    pub fn begin_edit(&mut self) -> bool {
        self.view.begin_edit()
    }

    pub fn cancel_edit(&mut self) {
        self.view.cancel_edit();
    }

    pub fn prepare_update(&mut self) -> Option<(TaskId, TaskDraft)> {
        match self.view.prepare_save()? {
            Ok(pair) => Some(pair),
            Err(err) => {
                self.notices.error(err.submit_message());
                None
            }
        }
    }

    pub fn finish_update(&mut self, result: Result<Task>) -> Option<FetchTicket> {
        match result {
            Ok(task) => {
                info!(id = %task.id, "todo updated");
                self.view.finish_save(Some(task));
                self.notices.success(UPDATED_MESSAGE);
                Some(self.begin_reload())
            }
            Err(err) => {
                warn!(error = %err, "update failed");
                self.view.finish_save(None);
                self.notices.error(err.submit_message());
                None
            }
        }
    }

    pub async fn submit_update<A: TodoApi + ?Sized>(&mut self, api: &A) {
        let Some((id, draft)) = self.prepare_update() else {
            return;
        };
        let result = api.update_task(&id, &draft).await;
        if let Some(ticket) = self.finish_update(result) {
            self.run_fetch(api, ticket).await;
        }
    }

    // Delete

    pub fn request_delete(&mut self) -> bool {
        self.view.request_delete()
    }

    /// Resolves the confirmation prompt. Returns the id to delete only when
    /// the user said yes and the task actually carries an id.
    pub fn confirm_delete(&mut self, confirmed: bool) -> Option<TaskId> {
        let id = self.view.answer_delete(confirmed)?;
        if id.is_empty() {
            self.notices.error(MISSING_ID_MESSAGE);
            self.view.finish_delete(false);
            return None;
        }
        Some(id)
    }

    /// A 404 means the task is already gone: the dialog closes and the list
    /// reloads just as on success. Page is left as is even if it is now empty.
    pub fn finish_delete(&mut self, result: Result<()>) -> Option<FetchTicket> {
        match result {
            Ok(()) => {
                self.notices.success(DELETED_MESSAGE);
                self.view.finish_delete(true);
                Some(self.begin_reload())
            }
            Err(err @ Error::NotFound(_)) => {
                warn!(error = %err, "delete target already gone");
                self.notices.error(err.delete_message());
                self.view.finish_delete(true);
                Some(self.begin_reload())
            }
            Err(err) => {
                warn!(error = %err, "delete failed");
                self.notices.error(err.delete_message());
                self.view.finish_delete(false);
                None
            }
        }
    }

    /// Deletes the task shown in the view dialog if `confirm` agrees.
    pub async fn delete_selected<A, F>(&mut self, api: &A, confirm: F)
    where
        A: TodoApi + ?Sized,
        F: FnOnce(&Task) -> bool,
    {
        if !self.request_delete() {
            return;
        }
        let confirmed = match self.view.task() {
            Some(task) => confirm(task),
            None => false,
        };
        let Some(id) = self.confirm_delete(confirmed) else {
            return;
        };
        let result = api.delete_task(&id).await;
        if let Some(ticket) = self.finish_delete(result) {
            self.run_fetch(api, ticket).await;
        }
    }
}
