use serde::{Deserialize, Serialize};

use crate::model::task::{Task, TaskStatus};

pub const DEFAULT_SORT_BY: &str = "createdAt";
pub const DEFAULT_ORDER: &str = "desc";

/// Status filter of the list. `All` is the "no filter" value and is never
/// sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub const CHOICES: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(TaskStatus::Pending),
        StatusFilter::Only(TaskStatus::InProgress),
        StatusFilter::Only(TaskStatus::Completed),
    ];

    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Only(status) => Some(*status),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    /// Empty input means no filter.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        TaskStatus::parse(input).map(StatusFilter::Only)
    }

    pub fn next(&self) -> Self {
        let idx = Self::CHOICES.iter().position(|c| c == self).unwrap_or(0);
        Self::CHOICES[(idx + 1) % Self::CHOICES.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub status: StatusFilter,
    pub sort_by: String,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, status: StatusFilter) -> Self {
        Self {
            page,
            limit,
            status,
            sort_by: DEFAULT_SORT_BY.to_string(),
            order: SortOrder::default(),
        }
    }

    /// Query string pairs for `GET /todos`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = self.status.status() {
            params.push(("status", status.as_str().to_string()));
        }
        params.push(("sortBy", self.sort_by.clone()));
        params.push(("order", self.order.as_str().to_string()));
        params
    }
}

/// Pagination block of a list response. Either field may be missing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub pagination: PageInfo,
}
