//! REST client for the todo backend

pub mod http;

use async_trait::async_trait;

use crate::model::page::{ListQuery, TaskPage};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::Result;

pub use http::HttpTodoApi;

/// Operations offered by the todo backend.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// Fetch one page of tasks
    async fn list_tasks(&self, query: &ListQuery) -> Result<TaskPage>;

    /// Fetch a single task
    async fn get_task(&self, id: &TaskId) -> Result<Task>;

    /// Create a task; the backend assigns id and timestamps
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task>;

    /// Replace every mutable field of a task
    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task>;

    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    /// Aggregate counts, shape owned by the backend
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Connection test against the API root
    async fn ping(&self) -> Result<()>;
}
