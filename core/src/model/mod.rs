pub mod page;
pub mod task;
