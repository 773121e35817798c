// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use common::{TaskPriority, TaskStatus};

use crate::api::DEFAULT_BASE_URL;
use crate::view::PriorityFilter;

pub const DEFAULT_STATE_FILE: &str = ".taskboard/state.json";

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Terminal front end for the task board service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Base URL of the task board service
    #[arg(long, global = true, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// File remembering the selected board between runs
    #[arg(long, global = true, env = "TASKBOARD_STATE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List boards, marking the selected one
    Boards,
    /// Board operations
    Board(BoardCommand),
    /// Select the active board by name or id
    Select { board: String },
    /// Show the active board grouped by status
    Show(ShowArgs),
    /// Task operations on the active board
    Task(TaskCommand),
}

#[derive(Args, Debug)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand, Debug)]
pub enum BoardAction {
    /// Create a new board
    Add { name: String },
}

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Only tasks whose title contains this text
    #[arg(long, default_value = "")]
    pub search: String,
    /// All, High, Medium or Low
    #[arg(long, default_value = "All")]
    pub priority: PriorityFilter,
}

#[derive(Args, Debug)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Create a task on the active board
    Add(TaskFields),
    /// Edit a task; omitted options keep their value, empty strings clear it
    Edit {
        /// Task id or unique id prefix
        task: String,
        #[command(flatten)]
        fields: TaskEditFields,
    },
    /// Move a task to another status column
    Move {
        task: String,
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Delete a task
    Delete {
        task: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct TaskFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,
    #[arg(long)]
    pub assigned_to: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due_date: Option<String>,
}

#[derive(Args, Debug)]
pub struct TaskEditFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,
    #[arg(long)]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub due_date: Option<String>,
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.parse()
}

fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    s.parse()
}
