pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notice;
pub mod status;
pub mod time;

pub use api::{HttpTodoApi, TodoApi};
pub use config::Config;
pub use controller::{Dashboard, DialogMode, FormField, TaskForm};
pub use error::Error;
pub use model::page::{ListQuery, PageInfo, StatusFilter, TaskPage};
pub use model::task::{Deadline, Task, TaskDraft, TaskId, TaskStatus};
pub use notice::{Notice, NoticeLevel, Notices};
pub use status::{display_badge, is_overdue, task_badge, BadgeKind, DisplayBadge};

pub type Result<T> = std::result::Result<T, Error>;
