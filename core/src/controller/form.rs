use crate::error::Error;
use crate::model::task::{Task, TaskDraft, TaskStatus};
use crate::time::{join_deadline, parse_deadline, split_deadline};
use crate::Result;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill all required fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Deadline,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Description,
        FormField::Deadline,
        FormField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Deadline => "Deadline",
            FormField::Status => "Status",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Deadline,
            FormField::Deadline => FormField::Status,
            FormField::Status => FormField::Title,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Title => FormField::Status,
            FormField::Description => FormField::Title,
            FormField::Deadline => FormField::Description,
            FormField::Status => FormField::Deadline,
        }
    }
}

/// Transient fields of the create and edit forms. The deadline is kept as
/// the text the user typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub status: TaskStatus,
    pub focus: FormField,
    /// Char index into the focused text field.
    pub cursor: usize,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the form from a loaded task, deadline in local `date T time`.
    pub fn from_task(task: &Task) -> Self {
        let (date, time) = split_deadline(task.deadline);
        let mut form = Self {
            title: task.title.clone(),
            description: task.description.clone(),
            deadline: join_deadline(&date, &time),
            status: task.status,
            ..Self::default()
        };
        form.cursor = form.title.chars().count();
        form
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> Result<TaskDraft> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.deadline.trim().is_empty()
        {
            return Err(Error::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        Ok(TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            deadline: parse_deadline(&self.deadline),
            status: self.status,
        })
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Description => Some(&self.description),
            FormField::Deadline => Some(&self.deadline),
            FormField::Status => None,
        }
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Status => None,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Title => self.title = value.to_string(),
            FormField::Description => self.description = value.to_string(),
            FormField::Deadline => self.deadline = value.to_string(),
            FormField::Status => {
                if let Some(status) = TaskStatus::parse(value) {
                    self.status = status;
                }
            }
        }
    }

    pub fn focus(&mut self, field: FormField) {
        self.focus = field;
        self.cursor = self.text(field).map(|t| t.chars().count()).unwrap_or(0);
    }

    pub fn focus_next(&mut self) {
        self.focus(self.focus.next());
    }

    pub fn focus_previous(&mut self) {
        self.focus(self.focus.previous());
    }

    pub fn input_char(&mut self, c: char) {
        let cursor = self.cursor;
        if let Some(text) = self.focused_text_mut() {
            let byte_index = text.chars().take(cursor).map(|c| c.len_utf8()).sum();
            text.insert(byte_index, c);
            self.cursor += 1;
        }
    }

    pub fn delete_char(&mut self) {
        let cursor = self.cursor;
        if cursor == 0 {
            return;
        }
        if let Some(text) = self.focused_text_mut() {
            let byte_index: usize = text.chars().take(cursor - 1).map(|c| c.len_utf8()).sum();
            text.remove(byte_index);
            self.cursor -= 1;
        }
    }

    /// Left/right: moves the cursor in text fields, cycles the status otherwise.
    pub fn move_left(&mut self) {
        if self.focus == FormField::Status {
            self.status = self.status.previous();
        } else if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.focus == FormField::Status {
            self.status = self.status.next();
        } else {
            let len = self.text(self.focus).map(|t| t.chars().count()).unwrap_or(0);
            if self.cursor < len {
                self.cursor += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Deadline, TaskId};
    use chrono::{TimeZone, Utc};

    fn filled() -> TaskForm {
        TaskForm {
            title: "Buy milk".to_string(),
            description: "2 litres".to_string(),
            deadline: "2025-01-01T10:00".to_string(),
            ..TaskForm::default()
        }
    }

    #[test]
    fn test_validate_requires_trimmed_fields() {
        for field in [FormField::Title, FormField::Description, FormField::Deadline] {
            let mut form = filled();
            form.set_field(field, "   ");
            assert_eq!(
                form.validate(),
                Err(Error::Validation(REQUIRED_FIELDS_MESSAGE.to_string()))
            );
        }
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn test_malformed_deadline_is_not_rejected() {
        let mut form = filled();
        form.deadline = "whenever".to_string();
        let draft = form.validate().unwrap();
        assert_eq!(draft.deadline, Deadline::Raw("whenever".to_string()));
    }

    #[test]
    fn test_from_task_round_trips_deadline() {
        let deadline = Utc.with_ymd_and_hms(2025, 7, 4, 15, 20, 0).unwrap();
        let task = Task {
            id: TaskId::new("t1"),
            title: "Fireworks".to_string(),
            description: "Buy them".to_string(),
            deadline,
            status: TaskStatus::InProgress,
            created_at: deadline,
            updated_at: deadline,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.status, TaskStatus::InProgress);
        assert_eq!(form.validate().unwrap().deadline, Deadline::At(deadline));
    }

    #[test]
    fn test_editing_respects_cursor() {
        let mut form = TaskForm::new();
        for c in "héllo".chars() {
            form.input_char(c);
        }
        form.move_left();
        form.move_left();
        form.input_char('X');
        assert_eq!(form.title, "hélXlo");
        form.delete_char();
        form.delete_char();
        assert_eq!(form.title, "hélo");
    }

    #[test]
    fn test_status_field_cycles() {
        let mut form = TaskForm::new();
        form.focus(FormField::Status);
        form.input_char('z');
        assert_eq!(form.title, "");
        form.move_right();
        assert_eq!(form.status, TaskStatus::InProgress);
        form.move_left();
        form.move_left();
        assert_eq!(form.status, TaskStatus::Completed);
    }
}
