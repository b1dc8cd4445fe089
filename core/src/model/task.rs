use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Backend-assigned identifier. Opaque to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Wire value, as used in query strings and bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pending" | "p" => Some(TaskStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" | "progress" | "i" => {
                Some(TaskStatus::InProgress)
            }
            "completed" | "complete" | "done" | "c" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::InProgress => TaskStatus::Pending,
            TaskStatus::Completed => TaskStatus::InProgress,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a task. Backends send `id`, `_id`, or both; a record with
/// neither decodes with an empty id.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    #[serde(default)]
    id: Option<TaskId>,
    #[serde(rename = "_id", default)]
    mongo_id: Option<TaskId>,
    title: String,
    description: String,
    deadline: DateTime<Utc>,
    #[serde(default)]
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let id = record
            .id
            .filter(|id| !id.is_empty())
            .or(record.mongo_id)
            .unwrap_or_else(|| TaskId::new(""));
        Task {
            id,
            title: record.title,
            description: record.description,
            deadline: record.deadline,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Deadline as submitted. Unparseable input is passed through untouched and
/// left for the backend to reject.
#[derive(Debug, Clone, PartialEq)]
pub enum Deadline {
    At(DateTime<Utc>),
    Raw(String),
}

impl Deadline {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Deadline::At(at) => Some(*at),
            Deadline::Raw(_) => None,
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            Deadline::At(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
            Deadline::Raw(raw) => raw.clone(),
        }
    }
}

impl Serialize for Deadline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

/// Mutable fields of a task. Sent whole on both create and update.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub deadline: Deadline,
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_mongo_style_id() {
        let json = r#"{
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "title": "Write report",
            "description": "Quarterly numbers",
            "deadline": "2025-03-01T09:30:00.000Z",
            "status": "in-progress",
            "createdAt": "2025-02-01T08:00:00.000Z",
            "updatedAt": "2025-02-02T08:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.deadline, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_deserialize_with_both_ids() {
        let json = r#"{
            "_id": "abc",
            "id": "abc",
            "title": "Write report",
            "description": "Quarterly numbers",
            "deadline": "2025-03-01T09:30:00.000Z",
            "createdAt": "2025-02-01T08:00:00.000Z",
            "updatedAt": "2025-02-02T08:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_str(), "abc");
        assert_eq!(task.status, TaskStatus::Pending);

        let without_id = json.replace(r#""_id": "abc","#, "").replace(r#""id": "abc","#, "");
        let task: Task = serde_json::from_str(&without_id).unwrap();
        assert!(task.id.is_empty());
    }

    #[test]
    fn test_serialized_task_decodes_again() {
        let task = Task {
            id: TaskId::new("xyz"),
            title: "t".to_string(),
            description: "d".to_string(),
            deadline: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            status: TaskStatus::Completed,
            created_at: Utc.with_ymd_and_hms(2024, 12, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 12, 2, 10, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(serde_json::from_str::<Task>(&json).unwrap(), task);
    }

    #[test]
    fn test_draft_serializes_absolute_deadline() {
        let draft = TaskDraft {
            title: "a".to_string(),
            description: "b".to_string(),
            deadline: Deadline::At(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()),
            status: TaskStatus::Pending,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["deadline"], "2025-01-01T10:00:00.000Z");
        assert_eq!(value["status"], "pending");
    }

    #[test]
    fn test_raw_deadline_passes_through() {
        let deadline = Deadline::Raw("someday".to_string());
        assert_eq!(deadline.to_wire(), "someday");
        assert!(deadline.instant().is_none());
    }

    #[test]
    fn test_status_parse_and_cycle() {
        assert_eq!(TaskStatus::parse("In-Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("later"), None);
        assert_eq!(TaskStatus::Completed.next(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.previous(), TaskStatus::Completed);
    }
}
