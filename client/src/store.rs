// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Session state: the board list, the selected board and its tasks.
//!
//! Every remote operation talks to the API first and only touches memory
//! once the call has succeeded, so a failure never leaves half-applied state.

use common::{Board, CreateBoardPayload, CreateTaskPayload, Task, TaskUpdate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::BoardsApi;
use crate::error::ClientError;
use crate::storage::{KeyValueStore, ACTIVE_BOARD_KEY};

pub struct BoardStore<A, S> {
    api: A,
    storage: S,
    boards: Vec<Board>,
    selected_board_id: Option<Uuid>,
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
}

impl<A: BoardsApi, S: KeyValueStore> BoardStore<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            boards: Vec::new(),
            selected_board_id: None,
            tasks: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Tasks of the selected board, in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_board_id(&self) -> Option<Uuid> {
        self.selected_board_id
    }

    pub fn selected_board(&self) -> Option<&Board> {
        let id = self.selected_board_id?;
        self.boards.iter().find(|board| board.id == id)
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Loads the boards and restores the selection from the previous session.
    ///
    /// The stored board is reselected if it still exists, otherwise the first
    /// board is, otherwise nothing. The outcome is written back to storage
    /// and the selected board's tasks are loaded.
    pub async fn initial_load(&mut self) -> Result<(), ClientError> {
        self.load_boards().await?;

        let saved = self
            .storage
            .get(ACTIVE_BOARD_KEY)
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok());
        let resolved = saved
            .filter(|id| self.boards.iter().any(|board| board.id == *id))
            .or_else(|| self.boards.first().map(|board| board.id));

        match resolved {
            Some(board_id) => {
                debug!("Restoring selection of board {}", board_id);
                self.select_board(board_id).await
            }
            None => {
                debug!("No board to select");
                self.selected_board_id = None;
                self.tasks.clear();
                Ok(())
            }
        }
    }

    /// Replaces the board list with the server's.
    pub async fn load_boards(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        self.error = None;
        let result = self.api.fetch_boards().await;
        self.loading = false;

        match result {
            Ok(boards) => {
                info!("Loaded {} boards", boards.len());
                self.boards = boards;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to load boards: {}", err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Replaces the in-memory tasks with the given board's tasks.
    pub async fn load_tasks(&mut self, board_id: Uuid) -> Result<(), ClientError> {
        self.loading = true;
        self.error = None;
        let result = self.api.fetch_tasks(board_id).await;
        self.loading = false;

        match result {
            Ok(tasks) => {
                info!("Loaded {} tasks for board {}", tasks.len(), board_id);
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to load tasks for board {}: {}", board_id, err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Selects a board, remembers it for the next session and reloads its tasks.
    pub async fn select_board(&mut self, board_id: Uuid) -> Result<(), ClientError> {
        self.storage.set(ACTIVE_BOARD_KEY, &board_id.to_string())?;
        self.selected_board_id = Some(board_id);
        // Tasks of other boards are never kept around.
        self.tasks.clear();
        self.load_tasks(board_id).await
    }

    /// Creates a board. The first board created in a session without a
    /// selection becomes the selected one.
    ///
    /// Once the board exists on the server the call succeeds; a failure to
    /// open it afterwards is only recorded in `error`.
    pub async fn add_board(&mut self, name: &str) -> Result<Board, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::validation("Board name is required"));
        }

        let payload = CreateBoardPayload {
            name: name.to_string(),
        };
        let board = self.api.create_board(&payload).await?;
        self.boards.push(board.clone());

        if self.selected_board_id.is_none() {
            if let Err(err) = self.select_board(board.id).await {
                warn!("Board {} created but could not be opened: {}", board.id, err);
                self.error = Some(err.to_string());
            }
        }

        Ok(board)
    }

    /// Creates a task on the selected board.
    pub async fn add_task(&mut self, payload: CreateTaskPayload) -> Result<Task, ClientError> {
        if payload.title.trim().is_empty() {
            return Err(ClientError::validation("Task title is required"));
        }
        let Some(board_id) = self.selected_board_id else {
            return Err(ClientError::validation("Select a board first"));
        };

        let task = self.api.create_task(board_id, &payload).await?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Sends a partial update and replaces the local copy with the server's answer.
    pub async fn update_task_remote(
        &mut self,
        task_id: Uuid,
        update: &TaskUpdate,
    ) -> Result<Task, ClientError> {
        let task = self.api.update_task(task_id, update).await?;
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
        }
        Ok(task)
    }

    /// Patches the in-memory copy only. Returns false if the task is not loaded.
    pub fn update_task_local(&mut self, task_id: Uuid, update: &TaskUpdate) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.apply(update);
                true
            }
            None => false,
        }
    }

    /// Deletes a task remotely, then drops it from memory.
    pub async fn remove_task(&mut self, task_id: Uuid) -> Result<(), ClientError> {
        self.api.delete_task(task_id).await?;
        self.tasks.retain(|task| task.id != task_id);
        Ok(())
    }
}
