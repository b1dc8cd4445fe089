//! Create dialog and the view/edit dialog of a selected task.

use crate::controller::form::TaskForm;
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::Result;

#[derive(Debug, Default)]
pub struct CreateDialog {
    open: bool,
    submitting: bool,
    pub form: TaskForm,
}

impl CreateDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing keeps whatever was typed.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn prepare_submit(&mut self) -> Result<TaskDraft> {
        let draft = self.form.validate()?;
        self.submitting = true;
        Ok(draft)
    }

    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded {
            self.form.clear();
            self.open = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenDialog {
    /// Last record loaded from the backend.
    pub task: Task,
    pub mode: DialogMode,
    pub form: TaskForm,
    pub confirming_delete: bool,
    pub busy: bool,
}

#[derive(Debug, Default)]
pub struct ViewDialog {
    current: Option<OpenDialog>,
}

impl ViewDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&OpenDialog> {
        self.current.as_ref()
    }

    pub fn task(&self) -> Option<&Task> {
        self.current.as_ref().map(|d| &d.task)
    }

    pub fn mode(&self) -> Option<DialogMode> {
        self.current.as_ref().map(|d| d.mode)
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.current.as_ref().is_some_and(|d| d.confirming_delete)
    }

    /// Form being edited; `None` unless in edit mode.
    pub fn edit_form_mut(&mut self) -> Option<&mut TaskForm> {
        match self.current.as_mut() {
            Some(dialog) if dialog.mode == DialogMode::Editing => Some(&mut dialog.form),
            _ => None,
        }
    }

    /// Always starts read-only.
    pub fn open(&mut self, task: Task) {
        let form = TaskForm::from_task(&task);
        self.current = Some(OpenDialog {
            task,
            mode: DialogMode::Viewing,
            form,
            confirming_delete: false,
            busy: false,
        });
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn begin_edit(&mut self) -> bool {
        match self.current.as_mut() {
            Some(dialog) if dialog.mode == DialogMode::Viewing => {
                dialog.mode = DialogMode::Editing;
                dialog.confirming_delete = false;
                true
            }
            _ => false,
        }
    }

    /// Discards edits and reseeds the form from the last-loaded task.
    pub fn cancel_edit(&mut self) {
        if let Some(dialog) = self.current.as_mut() {
            dialog.mode = DialogMode::Viewing;
            dialog.form = TaskForm::from_task(&dialog.task);
        }
    }

    /// `None` when there is nothing being edited.
    pub fn prepare_save(&mut self) -> Option<Result<(TaskId, TaskDraft)>> {
        let dialog = self.current.as_mut()?;
        if dialog.mode != DialogMode::Editing {
            return None;
        }
        Some(dialog.form.validate().map(|draft| {
            dialog.busy = true;
            (dialog.task.id.clone(), draft)
        }))
    }

    /// On success shows the refreshed record read-only; on failure stays in
    /// edit mode with the edits intact.
    pub fn finish_save(&mut self, updated: Option<Task>) {
        if let Some(dialog) = self.current.as_mut() {
            dialog.busy = false;
            if let Some(task) = updated {
                dialog.form = TaskForm::from_task(&task);
                dialog.task = task;
                dialog.mode = DialogMode::Viewing;
            }
        }
    }

    pub fn request_delete(&mut self) -> bool {
        match self.current.as_mut() {
            Some(dialog) if !dialog.busy => {
                dialog.confirming_delete = true;
                true
            }
            _ => false,
        }
    }

    /// Answer to the confirmation prompt; yields the id to delete on "yes".
    pub fn answer_delete(&mut self, confirmed: bool) -> Option<TaskId> {
        let dialog = self.current.as_mut()?;
        if !dialog.confirming_delete {
            return None;
        }
        dialog.confirming_delete = false;
        if confirmed {
            dialog.busy = true;
            Some(dialog.task.id.clone())
        } else {
            None
        }
    }

    pub fn finish_delete(&mut self, close: bool) {
        if close {
            self.close();
        } else if let Some(dialog) = self.current.as_mut() {
            dialog.busy = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;
    use chrono::{Duration, Utc};

    fn task() -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new("t-1"),
            title: "Original".to_string(),
            description: "Desc".to_string(),
            deadline: now + Duration::days(1),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_enters_viewing() {
        let mut dialog = ViewDialog::new();
        dialog.open(task());
        assert_eq!(dialog.mode(), Some(DialogMode::Viewing));
        assert!(dialog.edit_form_mut().is_none());
        assert!(dialog.prepare_save().is_none());
    }

    #[test]
    fn test_cancel_edit_reverts_fields() {
        let mut dialog = ViewDialog::new();
        dialog.open(task());
        assert!(dialog.begin_edit());
        if let Some(form) = dialog.edit_form_mut() {
            form.title = "Changed".to_string();
        }
        dialog.cancel_edit();
        let open = dialog.current().unwrap();
        assert_eq!(open.mode, DialogMode::Viewing);
        assert_eq!(open.form.title, "Original");
    }

    #[test]
    fn test_failed_save_keeps_edits() {
        let mut dialog = ViewDialog::new();
        dialog.open(task());
        dialog.begin_edit();
        dialog.edit_form_mut().unwrap().title = "Changed".to_string();
        let (id, draft) = dialog.prepare_save().unwrap().unwrap();
        assert_eq!(id.as_str(), "t-1");
        assert_eq!(draft.title, "Changed");

        dialog.finish_save(None);
        assert_eq!(dialog.mode(), Some(DialogMode::Editing));
        assert_eq!(dialog.edit_form_mut().unwrap().title, "Changed");
    }

    #[test]
    fn test_successful_save_shows_refreshed_record() {
        let mut dialog = ViewDialog::new();
        dialog.open(task());
        dialog.begin_edit();
        let mut updated = task();
        updated.title = "Server title".to_string();
        dialog.finish_save(Some(updated));
        assert_eq!(dialog.mode(), Some(DialogMode::Viewing));
        assert_eq!(dialog.task().unwrap().title, "Server title");
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut dialog = ViewDialog::new();
        dialog.open(task());
        assert_eq!(dialog.answer_delete(true), None);
        assert!(dialog.request_delete());
        assert_eq!(dialog.answer_delete(false), None);
        assert!(!dialog.is_confirming_delete());
        assert!(dialog.request_delete());
        assert_eq!(dialog.answer_delete(true), Some(TaskId::new("t-1")));
    }

    #[test]
    fn test_create_dialog_keeps_values_on_failure() {
        let mut create = CreateDialog::new();
        create.open();
        create.form.title = "T".to_string();
        create.form.description = "D".to_string();
        create.form.deadline = "2030-01-01T09:00".to_string();
        assert!(create.prepare_submit().is_ok());
        create.finish_submit(false);
        assert!(create.is_open());
        assert_eq!(create.form.title, "T");

        create.prepare_submit().unwrap();
        create.finish_submit(true);
        assert!(!create.is_open());
        assert_eq!(create.form, TaskForm::default());
    }
}
