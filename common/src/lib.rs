// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Workflow column a task sits in.
///
/// Serialized with the exact labels shown to users (`"To Do"`,
/// `"In Progress"`, `"Done"`), both on the wire and in the database.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    #[sqlx(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    #[sqlx(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Accepts the display label or a compact alias (`todo`, `in-progress`,
    /// `doing`, `done`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "to do" | "todo" | "to-do" => Ok(TaskStatus::ToDo),
            "in progress" | "in-progress" | "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!(
                "Unknown status '{}'. Expected one of: To Do, In Progress, Done.",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::High, TaskPriority::Medium, TaskPriority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(format!(
                "Unknown priority '{}'. Expected one of: Low, Medium, High.",
                other
            )),
        }
    }
}

/// A named board grouping tasks. Boards are never modified after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a task within a board.
///
/// `board_id` and `created_at` are fixed at creation. Whether a task is
/// overdue is derived from `due_date` at display time and never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Applies a partial update in place.
    ///
    /// `Clear` on a required field (title, status, priority) leaves it as is;
    /// rejecting those is the caller's job.
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let FieldUpdate::Set(title) = &update.title {
            self.title = title.clone();
        }
        if let FieldUpdate::Set(status) = update.status {
            self.status = status;
        }
        if let FieldUpdate::Set(priority) = update.priority {
            self.priority = priority;
        }
        update.description.clone().apply_to(&mut self.description);
        update.assigned_to.clone().apply_to(&mut self.assigned_to);
        update.due_date.map(|due| due.0).apply_to(&mut self.due_date);
    }
}

/// Body of `POST /boards`.
///
/// A missing `name` deserializes to an empty string so that it is reported
/// by the same validation as a blank one.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CreateBoardPayload {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /boards/{id}/tasks`. Omitted status and priority fall back
/// to their defaults (`To Do`, `Medium`).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,
}

/// Body of `PUT /tasks/{id}`.
///
/// Absent keys leave the stored value untouched, `null` clears it. Keys
/// naming immutable fields (`id`, `boardId`, `createdAt`) are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub title: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub description: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub status: FieldUpdate<TaskStatus>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub priority: FieldUpdate<TaskPriority>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub assigned_to: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_no_change")]
    pub due_date: FieldUpdate<DueDate>,
}

impl TaskUpdate {
    /// An update touching only the status column.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: FieldUpdate::Set(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_no_change()
            && self.description.is_no_change()
            && self.status.is_no_change()
            && self.priority.is_no_change()
            && self.assigned_to.is_no_change()
            && self.due_date.is_no_change()
    }
}

/// Tri-state value of one field in a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Key absent from the request.
    NoChange,
    /// Key present with a value.
    Set(T),
    /// Key present with `null`.
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn is_no_change(&self) -> bool {
        matches!(self, FieldUpdate::NoChange)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            FieldUpdate::NoChange => FieldUpdate::NoChange,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)),
            FieldUpdate::Clear => FieldUpdate::Clear,
        }
    }

    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldUpdate::Set(value) => serializer.serialize_some(value),
            FieldUpdate::Clear | FieldUpdate::NoChange => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    // Only called when the key is present; absence is handled by `#[serde(default)]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}

/// Due date as accepted from clients: an RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date, the latter meaning midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate(pub DateTime<Utc>);

impl From<DueDate> for DateTime<Utc> {
    fn from(due: DueDate) -> Self {
        due.0
    }
}

impl From<DateTime<Utc>> for DueDate {
    fn from(value: DateTime<Utc>) -> Self {
        DueDate(value)
    }
}

impl FromStr for DueDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
            return Ok(DueDate(date_time.with_timezone(&Utc)));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| DueDate(naive.and_utc()))
            .ok_or_else(|| format!("Invalid due date '{}'. Use YYYY-MM-DD or RFC 3339.", s))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            title: "Write docs".to_string(),
            description: Some("Explain the API".to_string()),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assigned_to: Some("Alice".to_string()),
            due_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_uses_display_labels_on_the_wire() {
        assert_eq!(json!(TaskStatus::InProgress), json!("In Progress"));
        let status: TaskStatus = serde_json::from_value(json!("To Do")).unwrap();
        assert_eq!(status, TaskStatus::ToDo);
        assert!(serde_json::from_value::<TaskStatus>(json!("Blocked")).is_err());
    }

    #[test]
    fn test_status_parses_aliases() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("TODO".parse::<TaskStatus>(), Ok(TaskStatus::ToDo));
        assert!("later".parse::<TaskStatus>().is_err());
        assert_eq!("high".parse::<TaskPriority>(), Ok(TaskPriority::High));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = sample_task();
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("boardId").is_some());
        assert!(value.get("assignedTo").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["status"], "To Do");
        assert_eq!(value["priority"], "Medium");
    }

    #[test]
    fn test_task_update_distinguishes_absent_and_null() {
        let update: TaskUpdate =
            serde_json::from_value(json!({ "status": "Done", "assignedTo": null })).unwrap();
        assert_eq!(update.status, FieldUpdate::Set(TaskStatus::Done));
        assert_eq!(update.assigned_to, FieldUpdate::Clear);
        assert_eq!(update.title, FieldUpdate::NoChange);
        assert_eq!(update.due_date, FieldUpdate::NoChange);
    }

    #[test]
    fn test_task_update_ignores_immutable_keys() {
        let update: TaskUpdate = serde_json::from_value(json!({
            "id": "whatever",
            "boardId": "elsewhere",
            "createdAt": "2020-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_task_update_serializes_only_touched_fields() {
        let mut update = TaskUpdate::status(TaskStatus::Done);
        update.description = FieldUpdate::Clear;
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({ "status": "Done", "description": null }));
    }

    #[test]
    fn test_apply_patches_only_given_fields() {
        let mut task = sample_task();
        let before = task.clone();
        let update = TaskUpdate {
            priority: FieldUpdate::Set(TaskPriority::High),
            assigned_to: FieldUpdate::Clear,
            title: FieldUpdate::Clear,
            ..Default::default()
        };

        task.apply(&update);

        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.assigned_to, None);
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.status, before.status);
    }

    #[test]
    fn test_due_date_accepts_plain_dates_and_timestamps() {
        let plain: DueDate = "2025-12-01".parse().unwrap();
        assert_eq!(plain.0, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());

        let stamped: DueDate = serde_json::from_value(json!("2025-12-01T10:30:00+02:00")).unwrap();
        assert_eq!(stamped.0, Utc.with_ymd_and_hms(2025, 12, 1, 8, 30, 0).unwrap());

        assert!("next week".parse::<DueDate>().is_err());
    }

    #[test]
    fn test_create_task_payload_defaults() {
        let payload: CreateTaskPayload = serde_json::from_value(json!({ "title": "Y" })).unwrap();
        assert_eq!(payload.title, "Y");
        assert_eq!(payload.status, None);
        assert_eq!(payload.priority, None);

        let missing: CreateBoardPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.name, "");
    }
}
