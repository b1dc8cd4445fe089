//! Paginated, filtered task list.
//!
//! State changes go through [`reduce`]. Every fetch carries a sequence number
//! and only the answer to the most recently issued fetch may touch the list.

use tracing::{debug, warn};

use crate::api::TodoApi;
use crate::config::DEFAULT_PAGE_LIMIT;
use crate::model::page::{ListQuery, StatusFilter, TaskPage};
use crate::model::task::Task;
use crate::notice::Notices;
use crate::Result;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load todos";

/// Page-number buttons shown at once.
pub const WINDOW_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub items: Vec<Task>,
    pub page: u32,
    pub limit: u32,
    /// Authoritative counts from the last successful fetch.
    pub total: u64,
    pub total_pages: u32,
    pub status: StatusFilter,
    /// Local only; not part of the fetch.
    pub search: String,
    pub loading: bool,
    pub error: Option<String>,
    pub latest_seq: u64,
}

impl ListState {
    pub fn new(limit: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            limit: limit.max(1),
            total: 0,
            total_pages: 1,
            status: StatusFilter::All,
            search: String::new(),
            loading: false,
            error: None,
            latest_seq: 0,
        }
    }

    /// The pair a fetch depends on.
    pub fn key(&self) -> (u32, StatusFilter) {
        (self.page, self.status)
    }

    pub fn query(&self) -> ListQuery {
        ListQuery::new(self.page, self.limit, self.status)
    }

    pub fn window(&self) -> Vec<u32> {
        pagination_window(self.page, self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    PageRequested(u32),
    StatusFilterChanged(StatusFilter),
    SearchChanged(String),
    FetchStarted { seq: u64 },
    FetchSucceeded { seq: u64, page: TaskPage },
    FetchFailed { seq: u64, message: String },
}

pub fn reduce(mut state: ListState, event: ListEvent) -> ListState {
    match event {
        ListEvent::PageRequested(page) => {
            if page >= 1 && page <= state.total_pages {
                state.page = page;
            }
        }
        ListEvent::StatusFilterChanged(status) => {
            state.status = status;
            state.page = 1;
        }
        ListEvent::SearchChanged(search) => {
            state.search = search;
        }
        ListEvent::FetchStarted { seq } => {
            state.latest_seq = seq;
            state.loading = true;
        }
        ListEvent::FetchSucceeded { seq, page } => {
            if seq != state.latest_seq {
                return state;
            }
            state.items = page.items;
            state.total = page.pagination.total.unwrap_or(state.total);
            state.total_pages = page.pagination.total_pages.unwrap_or(state.total_pages);
            state.loading = false;
            state.error = None;
        }
        ListEvent::FetchFailed { seq, message } => {
            if seq != state.latest_seq {
                return state;
            }
            state.loading = false;
            state.error = Some(message);
        }
    }
    state
}

/// At most [`WINDOW_SIZE`] page numbers, centered on `page` where possible and
/// never outside `1..=total_pages`.
pub fn pagination_window(page: u32, total_pages: u32) -> Vec<u32> {
    if total_pages <= WINDOW_SIZE {
        (1..=total_pages).collect()
    } else if page <= 3 {
        (1..=WINDOW_SIZE).collect()
    } else if page >= total_pages - 2 {
        (total_pages - WINDOW_SIZE + 1..=total_pages).collect()
    } else {
        (page - 2..=page + 2).collect()
    }
}

/// A list fetch that has been issued but not yet answered.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: ListQuery,
}

#[derive(Debug, Default)]
pub struct TodoListController {
    state: ListState,
    next_seq: u64,
}

impl TodoListController {
    pub fn new(limit: u32) -> Self {
        Self {
            state: ListState::new(limit),
            next_seq: 0,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn items(&self) -> &[Task] {
        &self.state.items
    }

    /// Applies `event`; returns whether the fetch key changed.
    pub fn dispatch(&mut self, event: ListEvent) -> bool {
        let before = self.state.key();
        self.state = reduce(std::mem::take(&mut self.state), event);
        before != self.state.key()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.dispatch(ListEvent::FetchStarted { seq });
        debug!(seq, page = self.state.page, status = ?self.state.status, "list fetch issued");
        FetchTicket {
            seq,
            query: self.state.query(),
        }
    }

    /// Returns whether the outcome was applied (false for stale answers).
    pub fn finish_fetch(&mut self, seq: u64, result: Result<TaskPage>, notices: &mut Notices) -> bool {
        if seq != self.state.latest_seq {
            debug!(seq, latest = self.state.latest_seq, "discarding stale list response");
            return false;
        }
        match result {
            Ok(page) => {
                self.dispatch(ListEvent::FetchSucceeded { seq, page });
            }
            Err(err) => {
                warn!(error = %err, "list fetch failed");
                self.dispatch(ListEvent::FetchFailed {
                    seq,
                    message: err.to_string(),
                });
                notices.error(LOAD_FAILED_MESSAGE);
            }
        }
        true
    }

    pub async fn reload<A: TodoApi + ?Sized>(&mut self, api: &A, notices: &mut Notices) {
        let ticket = self.begin_fetch();
        let result = api.list_tasks(&ticket.query).await;
        self.finish_fetch(ticket.seq, result, notices);
    }

    /// Out-of-range pages are ignored. Returns a fetch only if the page moved.
    pub fn request_page(&mut self, page: u32) -> Option<FetchTicket> {
        if self.dispatch(ListEvent::PageRequested(page)) {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    /// Resets to page 1. Returns a fetch only if `(page, status)` changed.
    pub fn set_status_filter(&mut self, status: StatusFilter) -> Option<FetchTicket> {
        if self.dispatch(ListEvent::StatusFilterChanged(status)) {
            Some(self.begin_fetch())
        } else {
            None
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.dispatch(ListEvent::SearchChanged(search.into()));
    }
}
