// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use axum::{
    routing::{get, put},
    Router,
};
use sqlx::SqlitePool;

/// Creates and configures the application router.
pub fn create_router(pool: SqlitePool) -> Router {
    Router::new()
        // `GET /boards` lists boards, `POST /boards` creates one
        .route(
            "/boards",
            get(handlers::list_boards).post(handlers::create_board),
        )
        // Tasks of a board: list and create
        .route(
            "/boards/{id}/tasks",
            get(handlers::list_board_tasks).post(handlers::create_task),
        )
        // Partial update and deletion of a single task
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        // Unknown paths and unsupported methods both answer 404 with a JSON message
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::route_not_found)
        // Adds the database pool to the application state
        .with_state(pool)
}
