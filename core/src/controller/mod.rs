pub mod dashboard;
pub mod dialog;
pub mod form;
pub mod list;


pub use dashboard::Dashboard;
pub use dialog::{CreateDialog, DialogMode, OpenDialog, ViewDialog};
pub use form::{FormField, TaskForm};
pub use list::{pagination_window, reduce, FetchTicket, ListEvent, ListState, TodoListController};
