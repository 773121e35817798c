// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use common::{FieldUpdate, Task, TaskUpdate};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use taskboard_client::api::HttpApiClient;
use taskboard_client::cli::{BoardAction, Cli, Commands, ShowArgs, TaskAction, TaskEditFields, TaskFields};
use taskboard_client::form::TaskForm;
use taskboard_client::storage::JsonFileStore;
use taskboard_client::store::BoardStore;
use taskboard_client::view::{self, BoardFilter, Notification};

type Store = BoardStore<HttpApiClient, JsonFileStore>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        debug!("{:?}", err);
        eprintln!("{}", Notification::error(err.to_string()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let storage = JsonFileStore::open(cli.state_file.clone())?;
    let api = HttpApiClient::new(&cli.api_url);
    debug!("Using API at {}", api.base_url());

    let mut store = BoardStore::new(api, storage);
    store.initial_load().await?;

    match cli.command {
        None => show(&store, ShowArgs::default()),
        Some(Commands::Show(args)) => show(&store, args),
        Some(Commands::Boards) => print!("{}", view::render_sidebar(&store)),
        Some(Commands::Board(cmd)) => match cmd.action {
            BoardAction::Add { name } => {
                let board = store.add_board(&name).await?;
                println!("{}", Notification::success(format!("Board \"{}\" created", board.name)));
                if let Some(message) = store.error() {
                    eprintln!("{}", Notification::error(message));
                }
            }
        },
        Some(Commands::Select { board }) => {
            let board_id = resolve_board(&store, &board)?;
            store.select_board(board_id).await?;
            print!("{}", view::render_sidebar(&store));
        }
        Some(Commands::Task(cmd)) => run_task(&mut store, cmd.action).await?,
    }

    Ok(())
}

fn show(store: &Store, args: ShowArgs) {
    let filter = BoardFilter {
        search: args.search,
        priority: args.priority,
    };
    print!("{}", view::render_board(store, &filter, Utc::now()));
}

async fn run_task(store: &mut Store, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Add(fields) => {
            let form = form_from_fields(fields);
            let task = store.add_task(form.into_create_payload()?).await?;
            println!("{}", Notification::success(format!("Task \"{}\" created", task.title)));
        }
        TaskAction::Edit { task, fields } => {
            let task = resolve_task(store, &task)?.clone();
            let update = edit_update(&task, fields)?;
            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            let updated = store.update_task_remote(task.id, &update).await?;
            println!("{}", Notification::success(format!("Task \"{}\" updated", updated.title)));
        }
        TaskAction::Move { task, status } => {
            let task_id = resolve_task(store, &task)?.id;
            match view::change_status(store, task_id, status).await {
                Some(note) => println!("{}", note),
                None => println!("Task is already in {}.", status),
            }
        }
        TaskAction::Delete { task, yes } => {
            let task = resolve_task(store, &task)?.clone();
            if !yes && !confirm(&view::confirm_delete_message(&task))? {
                println!("Cancelled.");
                return Ok(());
            }
            store.remove_task(task.id).await?;
            println!("{}", Notification::success("Task deleted"));
        }
    }
    Ok(())
}

fn form_from_fields(fields: TaskFields) -> TaskForm {
    TaskForm {
        title: fields.title,
        description: fields.description.unwrap_or_default(),
        status: fields.status.unwrap_or_default(),
        priority: fields.priority.unwrap_or_default(),
        assigned_to: fields.assigned_to.unwrap_or_default(),
        due_date: fields.due_date.unwrap_or_default(),
    }
}

/// Goes through the form so edits get the same validation as creation, then
/// keeps only the options that were passed.
fn edit_update(task: &Task, fields: TaskEditFields) -> Result<TaskUpdate> {
    let mut form = TaskForm::from_task(task);
    let touched = (
        fields.title.is_some(),
        fields.description.is_some(),
        fields.status.is_some(),
        fields.priority.is_some(),
        fields.assigned_to.is_some(),
        fields.due_date.is_some(),
    );

    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(status) = fields.status {
        form.status = status;
    }
    if let Some(priority) = fields.priority {
        form.priority = priority;
    }
    if let Some(assigned_to) = fields.assigned_to {
        form.assigned_to = assigned_to;
    }
    if let Some(due_date) = fields.due_date {
        form.due_date = due_date;
    }

    let full = form.into_update()?;
    Ok(TaskUpdate {
        title: keep_if(touched.0, full.title),
        description: keep_if(touched.1, full.description),
        status: keep_if(touched.2, full.status),
        priority: keep_if(touched.3, full.priority),
        assigned_to: keep_if(touched.4, full.assigned_to),
        due_date: keep_if(touched.5, full.due_date),
    })
}

fn keep_if<T>(touched: bool, update: FieldUpdate<T>) -> FieldUpdate<T> {
    if touched { update } else { FieldUpdate::NoChange }
}

fn resolve_board(store: &Store, reference: &str) -> Result<Uuid> {
    let reference = reference.trim();
    store
        .boards()
        .iter()
        .find(|board| board.id.to_string() == reference || board.name.eq_ignore_ascii_case(reference))
        .map(|board| board.id)
        .ok_or_else(|| anyhow!("Board not found: {}", reference))
}

/// Finds a loaded task by full id or by a unique prefix of its id.
fn resolve_task<'a>(store: &'a Store, reference: &str) -> Result<&'a Task> {
    let needle = reference.trim().to_lowercase().replace('-', "");
    if needle.is_empty() {
        bail!("Task reference is empty");
    }

    let mut matches = store
        .tasks()
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task),
        (None, _) => bail!("No task matching '{}' on this board", reference),
        (Some(_), Some(_)) => bail!("Task reference '{}' is ambiguous", reference),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
