// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Presentation of the store's data: sidebar, filtered three-column board,
//! task cards, and the drag and quick status interactions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use common::{Task, TaskPriority, TaskStatus, TaskUpdate};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::BoardsApi;
use crate::storage::KeyValueStore;
use crate::store::BoardStore;

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL_SECS: i64 = 4;

pub const NO_BOARD_MESSAGE: &str = "Select or create a board to get started.";
pub const EMPTY_COLUMN_MESSAGE: &str = "No tasks in this column";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TaskPriority),
}

impl PriorityFilter {
    fn matches(&self, priority: TaskPriority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => *wanted == priority,
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(PriorityFilter::All);
        }
        s.parse().map(PriorityFilter::Only)
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("All priorities"),
            PriorityFilter::Only(priority) => write!(f, "{}", priority),
        }
    }
}

/// Client-side search and priority filter. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardFilter {
    pub search: String,
    pub priority: PriorityFilter,
}

impl BoardFilter {
    /// Case-insensitive substring match on the title, then the priority filter.
    pub fn matches(&self, task: &Task) -> bool {
        let query = self.search.trim().to_lowercase();
        (query.is_empty() || task.title.to_lowercase().contains(&query))
            && self.priority.matches(task.priority)
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Splits the filtered tasks into the three status columns, keeping the
/// order they were given in.
pub fn group_by_status<'a>(tasks: &'a [Task], filter: &BoardFilter) -> [Column<'a>; 3] {
    let filtered = filter.apply(tasks);
    TaskStatus::ALL.map(|status| Column {
        status,
        tasks: filtered
            .iter()
            .copied()
            .filter(|task| task.status == status)
            .collect(),
    })
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status != TaskStatus::Done && task.due_date.is_some_and(|due| due < now)
}

pub fn format_due_date(due_date: Option<DateTime<Utc>>) -> String {
    match due_date {
        Some(due) => due.format("%b %-d, %Y").to_string(),
        None => "No due date".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown after an interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created: DateTime<Utc>,
    pub ttl: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message.into())
    }

    fn new(kind: NotificationKind, message: String) -> Self {
        Self {
            kind,
            message,
            created: Utc::now(),
            ttl: Duration::seconds(NOTIFICATION_TTL_SECS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created + self.ttl
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NotificationKind::Success => write!(f, "✓ {}", self.message),
            NotificationKind::Error => write!(f, "✗ {}", self.message),
        }
    }
}

/// A drop target: a status column and a position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub status: TaskStatus,
    pub index: usize,
}

/// Outcome of a drag gesture. `destination` is `None` when the card was
/// dropped outside every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragResult {
    pub task_id: Uuid,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

/// Applies a finished drag. Only a move into another column is persisted,
/// as a status-only update; reordering inside a column is not.
pub async fn handle_drag_end<A: BoardsApi, S: KeyValueStore>(
    store: &mut BoardStore<A, S>,
    drag: DragResult,
) -> Option<Notification> {
    let destination = drag.destination?;
    if destination.status == drag.source.status {
        return None;
    }

    let update = TaskUpdate::status(destination.status);
    match store.update_task_remote(drag.task_id, &update).await {
        Ok(_) => {
            info!("Task {} moved to {}", drag.task_id, destination.status);
            Some(Notification::success(format!(
                "Task moved to {}",
                destination.status
            )))
        }
        Err(err) => {
            error!("Failed to update task status: {}", err);
            Some(Notification::error("Failed to update task status"))
        }
    }
}

/// Per-card status selector. Choosing the current status is a no-op.
pub async fn change_status<A: BoardsApi, S: KeyValueStore>(
    store: &mut BoardStore<A, S>,
    task_id: Uuid,
    status: TaskStatus,
) -> Option<Notification> {
    let current = store.task(task_id).map(|task| task.status);
    if current == Some(status) {
        return None;
    }

    match store
        .update_task_remote(task_id, &TaskUpdate::status(status))
        .await
    {
        Ok(_) => Some(Notification::success(format!("Task moved to {}", status))),
        Err(err) => {
            error!("Failed to update task status: {}", err);
            Some(Notification::error(err.to_string()))
        }
    }
}

pub fn confirm_delete_message(task: &Task) -> String {
    format!(
        "Are you sure you want to delete \"{}\"? This action cannot be undone.",
        task.title
    )
}

/// First eight characters of an id, enough to refer to a task from a prompt.
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

pub fn render_sidebar<A: BoardsApi, S: KeyValueStore>(store: &BoardStore<A, S>) -> String {
    let mut out = String::from("Boards\n");
    if store.boards().is_empty() {
        out.push_str("  (no boards yet)\n");
        return out;
    }
    for board in store.boards() {
        let marker = if Some(board.id) == store.selected_board_id() {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!("{} {}\n", marker, board.name));
    }
    out
}

pub fn render_card(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  [{}] {} ({})\n",
        short_id(task.id),
        task.title,
        task.priority
    ));
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("      {}\n", description));
    }

    let mut footer = format_due_date(task.due_date);
    if is_overdue(task, now) {
        footer.push_str(" (Overdue)");
    }
    if let Some(assignee) = task.assigned_to.as_deref().filter(|a| !a.is_empty()) {
        footer.push_str(&format!(" · {}", assignee));
    }
    out.push_str(&format!("      {}\n", footer));
    out
}

/// Renders the selected board as three columns with their counts.
pub fn render_board<A: BoardsApi, S: KeyValueStore>(
    store: &BoardStore<A, S>,
    filter: &BoardFilter,
    now: DateTime<Utc>,
) -> String {
    let Some(board) = store.selected_board() else {
        return format!("{}\n", NO_BOARD_MESSAGE);
    };

    let mut out = format!("{}\n", board.name);
    out.push_str(&format!(
        "Tasks grouped by status · search: \"{}\" · {}\n",
        filter.search.trim(),
        filter.priority
    ));

    for column in group_by_status(store.tasks(), filter) {
        out.push_str(&format!(
            "\n{} ({})\n",
            column.status.as_str().to_uppercase(),
            column.count()
        ));
        if column.tasks.is_empty() {
            out.push_str(&format!("  {}\n", EMPTY_COLUMN_MESSAGE));
        }
        for task in column.tasks {
            out.push_str(&render_card(task, now));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{store_with, FakeApi};
    use chrono::TimeZone;

    fn task(title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: Uuid::new_v4(),
            board_id: Uuid::nil(),
            title: title.to_string(),
            description: None,
            status,
            priority,
            assigned_to: None,
            due_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_title_and_priority() {
        let tasks = vec![
            task("Build login form", TaskStatus::ToDo, TaskPriority::High),
            task("Login audit", TaskStatus::Done, TaskPriority::Low),
            task("Styles", TaskStatus::ToDo, TaskPriority::High),
        ];

        let search = BoardFilter {
            search: "LOGIN".to_string(),
            priority: PriorityFilter::All,
        };
        assert_eq!(search.apply(&tasks).len(), 2);

        let both = BoardFilter {
            search: "login".to_string(),
            priority: "High".parse().unwrap(),
        };
        let found = both.apply(&tasks);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Build login form");
    }

    #[test]
    fn test_priority_filter_parsing() {
        assert_eq!("all".parse::<PriorityFilter>().unwrap(), PriorityFilter::All);
        assert_eq!(
            "low".parse::<PriorityFilter>().unwrap(),
            PriorityFilter::Only(TaskPriority::Low)
        );
        assert!("urgent".parse::<PriorityFilter>().is_err());
    }

    #[test]
    fn test_group_by_status_keeps_creation_order() {
        let tasks = vec![
            task("a", TaskStatus::Done, TaskPriority::Low),
            task("b", TaskStatus::ToDo, TaskPriority::Low),
            task("c", TaskStatus::Done, TaskPriority::Low),
        ];

        let [todo, in_progress, done] = group_by_status(&tasks, &BoardFilter::default());

        assert_eq!(todo.count(), 1);
        assert_eq!(in_progress.count(), 0);
        let titles: Vec<&str> = done.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_overdue_and_due_date_format() {
        let now = Utc.with_ymd_and_hms(2025, 12, 2, 9, 0, 0).unwrap();
        let mut late = task("late", TaskStatus::ToDo, TaskPriority::High);
        late.due_date = Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());

        assert!(is_overdue(&late, now));
        assert_eq!(format_due_date(late.due_date), "Dec 1, 2025");
        assert!(render_card(&late, now).contains("Dec 1, 2025 (Overdue)"));

        late.status = TaskStatus::Done;
        assert!(!is_overdue(&late, now));
        assert_eq!(format_due_date(None), "No due date");
    }

    #[test]
    fn test_notification_expires() {
        let note = Notification::success("Task moved to Done");
        assert!(!note.is_expired(note.created));
        assert!(note.is_expired(note.created + Duration::seconds(NOTIFICATION_TTL_SECS)));
    }

    #[tokio::test]
    async fn test_drag_within_column_makes_no_call() {
        let api = FakeApi::with_boards(&["A"]);
        let t = api.seed_task(api.board_id(0), "t", TaskStatus::ToDo);
        let (mut store, _) = store_with(api);
        store.initial_load().await.unwrap();
        let calls_before = store.api().calls().len();

        let source = DropLocation {
            status: TaskStatus::ToDo,
            index: 0,
        };
        let reorder = DragResult {
            task_id: t.id,
            source,
            destination: Some(DropLocation { index: 3, ..source }),
        };
        assert_eq!(handle_drag_end(&mut store, reorder).await, None);

        let outside = DragResult {
            destination: None,
            ..reorder
        };
        assert_eq!(handle_drag_end(&mut store, outside).await, None);

        assert_eq!(store.api().calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_drag_to_other_column_issues_one_update() {
        let api = FakeApi::with_boards(&["A"]);
        let t = api.seed_task(api.board_id(0), "t", TaskStatus::ToDo);
        let (mut store, _) = store_with(api);
        store.initial_load().await.unwrap();
        let calls_before = store.api().calls().len();

        let drag = DragResult {
            task_id: t.id,
            source: DropLocation {
                status: TaskStatus::ToDo,
                index: 0,
            },
            destination: Some(DropLocation {
                status: TaskStatus::InProgress,
                index: 0,
            }),
        };
        let note = handle_drag_end(&mut store, drag).await.unwrap();

        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, "Task moved to In Progress");
        assert_eq!(store.api().calls().len(), calls_before + 1);
        assert_eq!(store.task(t.id).unwrap().status, TaskStatus::InProgress);

        store.api().fail_with(500, "An internal error occurred.");
        let back = DragResult {
            source: drag.destination.unwrap(),
            destination: Some(drag.source),
            ..drag
        };
        let note = handle_drag_end(&mut store, back).await.unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, "Failed to update task status");
        assert_eq!(store.task(t.id).unwrap().status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_change_status() {
        let api = FakeApi::with_boards(&["A"]);
        let t = api.seed_task(api.board_id(0), "t", TaskStatus::ToDo);
        let (mut store, _) = store_with(api);
        store.initial_load().await.unwrap();
        let calls_before = store.api().calls().len();

        // Same status: nothing to send.
        assert_eq!(change_status(&mut store, t.id, TaskStatus::ToDo).await, None);
        assert_eq!(store.api().calls().len(), calls_before);

        let note = change_status(&mut store, t.id, TaskStatus::Done).await.unwrap();
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, "Task moved to Done");
        assert_eq!(store.api().calls().len(), calls_before + 1);
        assert_eq!(
            store.api().updates.lock().as_slice(),
            &[TaskUpdate::status(TaskStatus::Done)]
        );
        assert_eq!(store.task(t.id).unwrap().status, TaskStatus::Done);

        store.api().fail_with(400, "Invalid status");
        let note = change_status(&mut store, t.id, TaskStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, "Invalid status");
        assert_eq!(store.task(t.id).unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_render_board_and_sidebar() {
        let api = FakeApi::with_boards(&["Roadmap", "Other"]);
        api.seed_task(api.board_id(0), "Define OKRs", TaskStatus::InProgress);
        let (mut store, _) = store_with(api);

        assert_eq!(
            render_board(&store, &BoardFilter::default(), Utc::now()),
            format!("{}\n", NO_BOARD_MESSAGE)
        );

        store.initial_load().await.unwrap();
        let board = render_board(&store, &BoardFilter::default(), Utc::now());
        assert!(board.starts_with("Roadmap\n"));
        assert!(board.contains("TO DO (0)"));
        assert!(board.contains("IN PROGRESS (1)"));
        assert!(board.contains("Define OKRs (Medium)"));
        assert!(board.contains(EMPTY_COLUMN_MESSAGE));

        let sidebar = render_sidebar(&store);
        assert!(sidebar.contains("> Roadmap"));
        assert!(sidebar.contains("  Other"));
    }
}
