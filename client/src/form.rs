// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::{CreateTaskPayload, DueDate, FieldUpdate, Task, TaskPriority, TaskStatus, TaskUpdate};

use crate::error::ClientError;

/// Editable fields of the create/edit task form, held as raw text the way
/// the user typed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: String,
    /// `YYYY-MM-DD`, or empty for no due date.
    pub due_date: String,
}

impl TaskForm {
    /// Pre-fills the form for editing an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            assigned_to: task.assigned_to.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|due| due.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("Task title is required"));
        }
        self.parsed_due_date()?;
        Ok(())
    }

    fn parsed_due_date(&self) -> Result<Option<DueDate>, ClientError> {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(ClientError::Validation)
    }

    /// Payload for a new task. Blank optional fields are left out.
    pub fn into_create_payload(self) -> Result<CreateTaskPayload, ClientError> {
        self.validate()?;
        let due_date = self.parsed_due_date()?;
        Ok(CreateTaskPayload {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            status: Some(self.status),
            priority: Some(self.priority),
            assigned_to: non_blank(self.assigned_to),
            due_date,
        })
    }

    /// Full update for an edited task. Blank optional fields clear the stored value.
    pub fn into_update(self) -> Result<TaskUpdate, ClientError> {
        self.validate()?;
        let due_date = match self.parsed_due_date()? {
            Some(due) => FieldUpdate::Set(due),
            None => FieldUpdate::Clear,
        };
        Ok(TaskUpdate {
            title: FieldUpdate::Set(self.title.trim().to_string()),
            description: set_or_clear(self.description),
            status: FieldUpdate::Set(self.status),
            priority: FieldUpdate::Set(self.priority),
            assigned_to: set_or_clear(self.assigned_to),
            due_date,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn set_or_clear(value: String) -> FieldUpdate<String> {
    match non_blank(value) {
        Some(value) => FieldUpdate::Set(value),
        None => FieldUpdate::Clear,
    }
}
