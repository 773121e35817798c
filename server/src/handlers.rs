// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{
    Board, CreateBoardPayload, CreateTaskPayload, ErrorResponse, FieldUpdate, Task, TaskUpdate,
};
use sqlx::SqlitePool;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Handler for listing all boards.
pub async fn list_boards(
    State(pool): State<SqlitePool>, // State injection (DB pool)
) -> Result<Json<Vec<Board>>, AppError> {
    let boards = database::get_boards_from_db(&pool).await?;
    info!("Successfully retrieved {} boards.", boards.len());
    Ok(Json(boards))
}

/// Handler for creating a new board.
pub async fn create_board(
    State(pool): State<SqlitePool>,
    ApiJson(payload): ApiJson<CreateBoardPayload>,
) -> Result<(StatusCode, Json<Board>), AppError> {
    debug!("Received request to create board: {:?}", payload.name);

    let name = payload.name.trim();
    if name.is_empty() {
        error!("Validation failed: Board name is empty.");
        return Err(AppError::Validation("Board name is required.".to_string()));
    }

    let board = database::create_board_in_db(&pool, name).await?;

    info!("Board created successfully with ID: {}", board.id);

    Ok((StatusCode::CREATED, Json(board)))
}

/// Handler for listing the tasks of a board.
/// The board itself is not looked up: an unknown board just has no tasks.
pub async fn list_board_tasks(
    State(pool): State<SqlitePool>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<Task>>, AppError> {
    let Ok(board_id) = Uuid::parse_str(&board_id) else {
        debug!("Board ID {} is not a valid identifier, no tasks to list.", board_id);
        return Ok(Json(Vec::new()));
    };

    let tasks = database::get_board_tasks_from_db(&pool, board_id).await?;
    info!(
        "Successfully retrieved {} tasks for board {}.",
        tasks.len(),
        board_id
    );
    Ok(Json(tasks))
}

/// Handler for creating a new task under a board.
pub async fn create_task(
    State(pool): State<SqlitePool>,
    Path(board_id): Path<String>,
    ApiJson(mut payload): ApiJson<CreateTaskPayload>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    debug!(
        "Received request to create task {:?} on board {}",
        payload.title, board_id
    );

    let title = payload.title.trim();
    if title.is_empty() {
        error!("Validation failed: Task title is empty.");
        return Err(AppError::Validation("Task title is required.".to_string()));
    }
    payload.title = title.to_string();

    let board_exists = match Uuid::parse_str(&board_id) {
        Ok(id) => database::board_exists_in_db(&pool, id).await?.then_some(id),
        Err(_) => None,
    };
    let Some(board_id) = board_exists else {
        error!("Board with ID {} not found for task creation.", board_id);
        return Err(AppError::NotFound("Board not found.".to_string()));
    };

    let task = database::create_task_in_db(&pool, board_id, payload).await?;

    info!("Task created successfully with ID: {}", task.id);

    // Return a 201 Created status with the new task as JSON.
    Ok((StatusCode::CREATED, Json(task)))
}

/// Checks a partial update before it reaches the database and trims the title.
fn validate_update(update: &mut TaskUpdate) -> Result<(), AppError> {
    match &mut update.title {
        FieldUpdate::Set(title) if !title.trim().is_empty() => {
            *title = title.trim().to_string();
        }
        FieldUpdate::NoChange => {}
        _ => return Err(AppError::Validation("Task title is required.".to_string())),
    }
    if matches!(update.status, FieldUpdate::Clear) {
        return Err(AppError::Validation("Task status cannot be null.".to_string()));
    }
    if matches!(update.priority, FieldUpdate::Clear) {
        return Err(AppError::Validation("Task priority cannot be null.".to_string()));
    }
    Ok(())
}

/// Handler for a partial update of a task by ID.
pub async fn update_task(
    State(pool): State<SqlitePool>,
    Path(task_id): Path<String>,
    ApiJson(mut update): ApiJson<TaskUpdate>,
) -> Result<Json<Task>, AppError> {
    debug!("Attempting to update task with ID: {}", task_id);

    if let Err(err) = validate_update(&mut update) {
        error!("Validation failed for task {}: {}", task_id, err);
        return Err(err);
    }

    let updated = match Uuid::parse_str(&task_id) {
        Ok(id) => database::update_task_in_db(&pool, id, &update).await?,
        Err(_) => None,
    };

    match updated {
        Some(task) => {
            info!("Task with ID {} updated successfully.", task.id);
            Ok(Json(task))
        }
        None => {
            error!("Task with ID {} not found for update.", task_id);
            Err(AppError::NotFound("Task not found.".to_string()))
        }
    }
}

/// Handler for deleting a task by ID.
pub async fn delete_task(
    State(pool): State<SqlitePool>,
    Path(task_id): Path<String>, // Extract task ID from the URL path
) -> Result<StatusCode, AppError> {
    debug!("Attempting to delete task with ID: {}", task_id);

    let deleted = match Uuid::parse_str(&task_id) {
        Ok(id) => database::delete_task_from_db(&pool, id).await?,
        Err(_) => false,
    };

    if deleted {
        info!("Task with ID {} deleted successfully.", task_id);
        Ok(StatusCode::NO_CONTENT) // 204 No Content for successful deletion
    } else {
        error!("Task with ID {} not found for deletion.", task_id);
        Err(AppError::NotFound("Task not found.".to_string()))
    }
}

/// Fallback for any path or method the router does not know.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

// --- Custom Error Handling ---

/// Our custom error type for the application.
///
/// Every variant renders as `{"message": ...}`. Internal errors only ever
/// expose a generic message; the cause is logged when the error is created.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("An internal error occurred.")]
    Internal(anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Allows converting an `anyhow::Error` (coming from `database.rs`)
/// into our `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Log the internal error for debugging.
        tracing::error!("Internal server error: {:?}", err);
        AppError::Internal(err)
    }
}

/// Malformed JSON, wrong types and unknown enum values are all client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// Allows Axum to convert our `AppError` into an HTTP `Response`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            code.as_u16(),
            self
        );
        (
            code,
            Json(ErrorResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// `Json` extractor whose rejections become `AppError::Validation`,
/// so bad bodies get a 400 with a JSON `message` like every other error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
