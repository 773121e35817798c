// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use common::{Board, CreateTaskPayload, FieldUpdate, Task, TaskUpdate};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{migrate::MigrateDatabase, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS boards (
        id BLOB PRIMARY KEY NOT NULL,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        created_at TIMESTAMP NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id BLOB PRIMARY KEY NOT NULL,
        board_id BLOB NOT NULL,
        title TEXT NOT NULL CHECK (length(trim(title)) > 0),
        description TEXT NULL,
        status TEXT NOT NULL DEFAULT 'To Do'
            CHECK (status IN ('To Do', 'In Progress', 'Done')),
        priority TEXT NOT NULL DEFAULT 'Medium'
            CHECK (priority IN ('Low', 'Medium', 'High')),
        assigned_to TEXT NULL,
        due_date TIMESTAMP NULL,
        created_at TIMESTAMP NOT NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_board_id ON tasks (board_id);",
];

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Establishes the database connection pool.
/// If the database file (or its directory) does not exist, it is created.
/// It also ensures the `boards` and `tasks` tables exist.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !is_in_memory(database_url) {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?;
        if let Some(parent) = options.get_filename().parent() {
            ensure_directory(parent)?;
        }

        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url)
                .await
                .context("Failed to create database")?;
        } else {
            info!("Database already exists.");
        }
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    init_schema(&pool).await?;

    Ok(pool)
}

fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    info!("Creating database directory {}", dir.display());
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Creates the tables and indexes if they are missing.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to apply database schema")?;
    }
    info!("'boards' and 'tasks' tables are ready.");
    Ok(())
}

// Listings order by rowid: rows are only ever appended, so it follows creation order
// even when two records share a `created_at` value.

/// Retrieves every board, oldest first.
pub async fn get_boards_from_db(pool: &SqlitePool) -> Result<Vec<Board>> {
    let boards = sqlx::query_as::<_, Board>("SELECT id, name, created_at FROM boards ORDER BY rowid ASC")
        .fetch_all(pool)
        .await
        .context("Failed to retrieve boards from DB")?;

    Ok(boards)
}

/// Inserts a new board. `name` must already be trimmed and non-empty.
pub async fn create_board_in_db(pool: &SqlitePool, name: &str) -> Result<Board> {
    let board = Board {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: Utc::now(),
    };

    debug!("Insert board: id={}, name={}", board.id, board.name);

    sqlx::query("INSERT INTO boards (id, name, created_at) VALUES (?, ?, ?)")
        .bind(board.id)
        .bind(&board.name)
        .bind(board.created_at)
        .execute(pool)
        .await
        .context("Failed to insert board into DB")?;

    Ok(board)
}

pub async fn board_exists_in_db(pool: &SqlitePool, board_id: Uuid) -> Result<bool> {
    let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM boards WHERE id = ?")
        .bind(board_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to look up board with ID: {}", board_id))?;

    Ok(found.is_some())
}

/// Retrieves the tasks of one board, oldest first. An unknown board simply has no tasks.
pub async fn get_board_tasks_from_db(pool: &SqlitePool, board_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, board_id, title, description, status, priority, assigned_to, due_date, created_at \
         FROM tasks WHERE board_id = ? ORDER BY rowid ASC",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to retrieve tasks for board {} from DB", board_id))?;

    Ok(tasks)
}

/// Inserts a new task under `board_id`, applying status and priority defaults.
/// The title must already be trimmed and non-empty.
pub async fn create_task_in_db(
    pool: &SqlitePool,
    board_id: Uuid,
    payload: CreateTaskPayload,
) -> Result<Task> {
    let task = Task {
        id: Uuid::new_v4(),
        board_id,
        title: payload.title,
        description: payload.description,
        status: payload.status.unwrap_or_default(),
        priority: payload.priority.unwrap_or_default(),
        assigned_to: payload.assigned_to,
        due_date: payload.due_date.map(|due| due.0),
        created_at: Utc::now(),
    };

    debug!(
        "Insert task: id={}, board_id={}, title={}, status={}, priority={}, due_date={:?}",
        task.id, task.board_id, task.title, task.status, task.priority, task.due_date
    );

    sqlx::query(
        "INSERT INTO tasks (id, board_id, title, description, status, priority, assigned_to, due_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(task.id)
    .bind(task.board_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(&task.assigned_to)
    .bind(task.due_date)
    .bind(task.created_at)
    .execute(pool)
    .await
    .context("Failed to insert task into DB")?;

    Ok(task)
}

pub async fn get_task_from_db(pool: &SqlitePool, task_id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>(
        "SELECT id, board_id, title, description, status, priority, assigned_to, due_date, created_at \
         FROM tasks WHERE id = ?",
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to retrieve task with ID: {}", task_id))?;

    Ok(task)
}

/// Turns a field update into the value to bind, or `None` when the column is untouched.
fn column_value<T: Clone>(update: &FieldUpdate<T>) -> Option<Option<T>> {
    match update {
        FieldUpdate::NoChange => None,
        FieldUpdate::Set(value) => Some(Some(value.clone())),
        FieldUpdate::Clear => Some(None),
    }
}

/// Applies a partial update in a single statement and returns the stored result.
/// Returns `None` if no task with the given ID exists.
///
/// Required columns (title, status, priority) are only written when `Set`;
/// the handler rejects `Clear` for them before getting here.
pub async fn update_task_in_db(
    pool: &SqlitePool,
    task_id: Uuid,
    update: &TaskUpdate,
) -> Result<Option<Task>> {
    if update.is_empty() {
        debug!("Empty update for task {}, returning it unchanged", task_id);
        return get_task_from_db(pool, task_id).await;
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
    {
        let mut columns = builder.separated(", ");
        if let FieldUpdate::Set(title) = &update.title {
            columns.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(description) = column_value(&update.description) {
            columns.push("description = ").push_bind_unseparated(description);
        }
        if let FieldUpdate::Set(status) = update.status {
            columns.push("status = ").push_bind_unseparated(status);
        }
        if let FieldUpdate::Set(priority) = update.priority {
            columns.push("priority = ").push_bind_unseparated(priority);
        }
        if let Some(assigned_to) = column_value(&update.assigned_to) {
            columns.push("assigned_to = ").push_bind_unseparated(assigned_to);
        }
        if let Some(due_date) = column_value(&update.due_date.map(|due| due.0)) {
            columns.push("due_date = ").push_bind_unseparated(due_date);
        }
    }
    builder
        .push(" WHERE id = ")
        .push_bind(task_id)
        .push(
            " RETURNING id, board_id, title, description, status, priority, assigned_to, due_date, created_at",
        );

    let task = builder
        .build_query_as::<Task>()
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to update task with ID: {}", task_id))?;

    info!(
        "Updated task ID: {} (found: {})",
        task_id,
        task.is_some()
    );

    Ok(task)
}

/// Deletes a task by ID.
/// Returns true if a task was deleted, false if no task with the given ID was found.
pub async fn delete_task_from_db(pool: &SqlitePool, task_id: Uuid) -> Result<bool> {
    debug!("Attempting to delete task with ID: {}", task_id);
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete task with ID: {}", task_id))?;

    let rows_affected = result.rows_affected();
    info!("Deleted {} rows for task ID: {}", rows_affected, task_id);

    Ok(rows_affected > 0)
}

/// Removes every task and board. Used before seeding demo data.
pub async fn clear_all_in_db(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to open transaction")?;
    sqlx::query("DELETE FROM tasks")
        .execute(&mut *tx)
        .await
        .context("Failed to clear tasks")?;
    sqlx::query("DELETE FROM boards")
        .execute(&mut *tx)
        .await
        .context("Failed to clear boards")?;
    tx.commit().await.context("Failed to commit clearing the store")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::{DueDate, TaskPriority, TaskStatus};
    use sqlx::sqlite::SqlitePoolOptions;

    /// Helper function to set up an in-memory SQLite database for testing.
    /// A single connection keeps every query on the same in-memory database.
    async fn setup_test_db() -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        init_schema(&pool).await?;
        Ok(pool)
    }

    fn task_payload(title: &str) -> CreateTaskPayload {
        CreateTaskPayload {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list_boards_in_creation_order() {
        let pool = setup_test_db().await.unwrap();

        let first = create_board_in_db(&pool, "Roadmap").await.unwrap();
        let second = create_board_in_db(&pool, "Frontend").await.unwrap();

        let boards = get_boards_from_db(&pool).await.unwrap();
        let ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(boards[0].name, "Roadmap");
        assert!(board_exists_in_db(&pool, first.id).await.unwrap());
        assert!(!board_exists_in_db(&pool, Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_task_applies_defaults() {
        let pool = setup_test_db().await.unwrap();
        let board = create_board_in_db(&pool, "Board").await.unwrap();

        let task = create_task_in_db(&pool, board.id, task_payload("Write tests"))
            .await
            .unwrap();

        assert_eq!(task.board_id, board.id);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.description, None);

        let stored = get_task_from_db(&pool, task.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Write tests");
        assert_eq!(stored.status, TaskStatus::ToDo);
    }

    #[tokio::test]
    async fn test_board_tasks_are_scoped_and_ordered() {
        let pool = setup_test_db().await.unwrap();
        let board_a = create_board_in_db(&pool, "A").await.unwrap();
        let board_b = create_board_in_db(&pool, "B").await.unwrap();

        let first = create_task_in_db(&pool, board_a.id, task_payload("first")).await.unwrap();
        create_task_in_db(&pool, board_b.id, task_payload("other")).await.unwrap();
        let second = create_task_in_db(&pool, board_a.id, task_payload("second")).await.unwrap();

        let tasks = get_board_tasks_from_db(&pool, board_a.id).await.unwrap();
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        let none = get_board_tasks_from_db(&pool, Uuid::new_v4()).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_update_task_touches_only_given_fields() {
        let pool = setup_test_db().await.unwrap();
        let board = create_board_in_db(&pool, "Board").await.unwrap();
        let due = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let created = create_task_in_db(
            &pool,
            board.id,
            CreateTaskPayload {
                title: "Ship it".to_string(),
                description: Some("Before Friday".to_string()),
                priority: Some(TaskPriority::Low),
                assigned_to: Some("Bob".to_string()),
                due_date: Some(DueDate(due)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_task_in_db(&pool, created.id, &TaskUpdate::status(TaskStatus::Done))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.assigned_to, created.assigned_to);
        assert_eq!(updated.due_date, Some(due));
        assert_eq!(updated.board_id, created.board_id);
    }

    #[tokio::test]
    async fn test_update_task_clears_optional_fields() {
        let pool = setup_test_db().await.unwrap();
        let board = create_board_in_db(&pool, "Board").await.unwrap();
        let created = create_task_in_db(
            &pool,
            board.id,
            CreateTaskPayload {
                title: "Ship it".to_string(),
                assigned_to: Some("Bob".to_string()),
                due_date: Some(DueDate(Utc::now() + Duration::days(2))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let update = TaskUpdate {
            assigned_to: FieldUpdate::Clear,
            due_date: FieldUpdate::Clear,
            ..Default::default()
        };
        let updated = update_task_in_db(&pool, created.id, &update).await.unwrap().unwrap();

        assert_eq!(updated.assigned_to, None);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.title, "Ship it");
    }

    #[tokio::test]
    async fn test_update_missing_task_returns_none() {
        let pool = setup_test_db().await.unwrap();

        let missing = update_task_in_db(&pool, Uuid::new_v4(), &TaskUpdate::status(TaskStatus::Done))
            .await
            .unwrap();
        assert!(missing.is_none());

        let empty = update_task_in_db(&pool, Uuid::new_v4(), &TaskUpdate::default())
            .await
            .unwrap();
        assert!(empty.is_none());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let pool = setup_test_db().await.unwrap();
        let board = create_board_in_db(&pool, "Board").await.unwrap();
        let task = create_task_in_db(&pool, board.id, task_payload("Temporary")).await.unwrap();

        assert!(delete_task_from_db(&pool, task.id).await.unwrap());
        assert!(!delete_task_from_db(&pool, task.id).await.unwrap());
        assert!(get_board_tasks_from_db(&pool, board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let pool = setup_test_db().await.unwrap();
        let board = create_board_in_db(&pool, "Board").await.unwrap();
        create_task_in_db(&pool, board.id, task_payload("Task")).await.unwrap();

        clear_all_in_db(&pool).await.unwrap();

        assert!(get_boards_from_db(&pool).await.unwrap().is_empty());
        assert!(get_board_tasks_from_db(&pool, board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_establish_connection_pool_creates_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("taskboard.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = establish_connection_pool(&url).await.unwrap();
        create_board_in_db(&pool, "Persisted").await.unwrap();
        pool.close().await;

        assert!(db_path.exists());
        let reopened = establish_connection_pool(&url).await.unwrap();
        assert_eq!(get_boards_from_db(&reopened).await.unwrap().len(), 1);
    }
}
