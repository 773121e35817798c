// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use common::{CreateTaskPayload, DueDate, TaskPriority, TaskStatus};
use sqlx::SqlitePool;
use tracing::info;

use crate::database;

struct DemoTask {
    board: usize,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    assigned_to: &'static str,
    due: DemoDue,
}

enum DemoDue {
    /// Days from now, negative for overdue.
    Relative(i64),
    /// Fixed calendar date.
    On(i32, u32, u32),
}

const DEMO_BOARDS: [&str; 2] = ["Product Roadmap", "Frontend Tasks"];

fn demo_tasks() -> Vec<DemoTask> {
    vec![
        DemoTask {
            board: 0,
            title: "Define Q1 OKRs",
            description: "Work with leadership to finalize Q1 objectives.",
            status: TaskStatus::ToDo,
            priority: TaskPriority::High,
            assigned_to: "Alice",
            due: DemoDue::Relative(3),
        },
        DemoTask {
            board: 0,
            title: "Competitive analysis",
            description: "Review top 3 competitors for feature gaps.",
            status: TaskStatus::InProgress,
            priority: TaskPriority::Medium,
            assigned_to: "Bob",
            due: DemoDue::Relative(-1),
        },
        DemoTask {
            board: 0,
            title: "Launch announcement draft",
            description: "Prepare messaging for beta launch.",
            status: TaskStatus::Done,
            priority: TaskPriority::Low,
            assigned_to: "Carol",
            due: DemoDue::Relative(-2),
        },
        DemoTask {
            board: 1,
            title: "Build login form",
            description: "Create login form with validation",
            status: TaskStatus::ToDo,
            priority: TaskPriority::High,
            assigned_to: "Alice",
            due: DemoDue::On(2025, 12, 1),
        },
        DemoTask {
            board: 1,
            title: "Implement Board view",
            description: "Three-column layout for task statuses.",
            status: TaskStatus::InProgress,
            priority: TaskPriority::Medium,
            assigned_to: "Dave",
            due: DemoDue::Relative(5),
        },
        DemoTask {
            board: 1,
            title: "Add responsive styles",
            description: "Ensure layout works on mobile.",
            status: TaskStatus::ToDo,
            priority: TaskPriority::Low,
            assigned_to: "Eve",
            due: DemoDue::Relative(7),
        },
    ]
}

/// Wipes the store and inserts the demo boards and tasks.
/// Returns the number of boards and tasks inserted.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<(usize, usize)> {
    database::clear_all_in_db(pool).await?;

    let mut boards = Vec::with_capacity(DEMO_BOARDS.len());
    for name in DEMO_BOARDS {
        boards.push(database::create_board_in_db(pool, name).await?);
    }

    let now = Utc::now();
    let tasks = demo_tasks();
    for task in &tasks {
        let due_date = match task.due {
            DemoDue::Relative(days) => Some(now + Duration::days(days)),
            DemoDue::On(year, month, day) => Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single(),
        };
        let payload = CreateTaskPayload {
            title: task.title.to_string(),
            description: Some(task.description.to_string()),
            status: Some(task.status),
            priority: Some(task.priority),
            assigned_to: Some(task.assigned_to.to_string()),
            due_date: due_date.map(DueDate),
        };
        database::create_task_in_db(pool, boards[task.board].id, payload).await?;
    }

    info!(
        "Seeded {} boards and {} tasks.",
        boards.len(),
        tasks.len()
    );

    Ok((boards.len(), tasks.len()))
}
