/*
[INPUT]:  Subcommand arguments and a TaskGateway
[OUTPUT]: Task table/detail output, created/updated/deleted tasks
[POS]:    CLI commands - scriptable counterparts of the TUI actions
[UPDATE]: When subcommand behavior or output format changes
*/

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use unicode_width::UnicodeWidthStr;

use geotask::form::validate_fields;
use geotask_gateway::{Task, TaskGateway, TaskId, TaskUpdate};

const TITLE_COLUMN: usize = 32;

pub async fn run_list(gateway: &dyn TaskGateway) -> Result<()> {
    let tasks = gateway.list().await.context("list tasks")?;
    print!("{}", format_task_table(&tasks));
    Ok(())
}

pub async fn run_show(gateway: &dyn TaskGateway, id: TaskId) -> Result<()> {
    let task = gateway
        .get_by_id(id)
        .await
        .with_context(|| format!("get task {id}"))?;
    print!("{}", format_task_detail(&task));
    Ok(())
}

/// Create a task through the same rules as the form
pub async fn run_add(
    gateway: &dyn TaskGateway,
    title: &str,
    description: Option<&str>,
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> Result<Task> {
    let validated = validate_fields(
        title,
        description.unwrap_or_default(),
        latitude.unwrap_or_default(),
        longitude.unwrap_or_default(),
    )?;
    let task = gateway
        .create(validated.to_new_task())
        .await
        .context("create task")?;
    println!(
        "{} task #{}: {}",
        style("Created").green().bold(),
        task.id,
        task.title
    );
    Ok(task)
}

pub async fn run_done(gateway: &dyn TaskGateway, id: TaskId, undo: bool) -> Result<Task> {
    let task = gateway
        .update(id, TaskUpdate::done(!undo))
        .await
        .with_context(|| format!("update task {id}"))?;
    let state = if task.is_done { "done" } else { "open" };
    println!("Task #{} is now {}", task.id, style(state).bold());
    Ok(task)
}

/// Delete a task, asking first unless `yes` is set
///
/// Returns whether a delete request was sent.
pub async fn run_delete(gateway: &dyn TaskGateway, id: TaskId, yes: bool) -> Result<bool> {
    if !yes {
        let task = gateway
            .get_by_id(id)
            .await
            .with_context(|| format!("get task {id}"))?;
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete task #{} \"{}\"?", task.id, task.title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", style("Kept.").yellow());
            return Ok(false);
        }
    }
    gateway
        .delete(id)
        .await
        .with_context(|| format!("delete task {id}"))?;
    println!("{} task #{id}", style("Deleted").red().bold());
    Ok(true)
}

pub fn format_task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<4}  {}  {}\n",
        "ID",
        "DONE",
        pad("TITLE", TITLE_COLUMN),
        "LOCATION"
    );
    for task in tasks {
        let done = if task.is_done { "x" } else { "" };
        let location = task
            .coordinate()
            .map(|coordinate| coordinate.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>5}  {:<4}  {}  {}\n",
            task.id,
            done,
            pad(&task.title, TITLE_COLUMN),
            location
        ));
    }
    out
}

pub fn format_task_detail(task: &Task) -> String {
    let mut out = format!("Task #{}\n", task.id);
    out.push_str(&format!("  Title:       {}\n", task.title));
    out.push_str(&format!(
        "  Status:      {}\n",
        if task.is_done { "done" } else { "open" }
    ));
    if let Some(description) = &task.description {
        out.push_str(&format!("  Description: {description}\n"));
    }
    if let Some(coordinate) = task.coordinate() {
        out.push_str(&format!("  Location:    {coordinate}\n"));
    }
    if let Some(created) = task.created_display() {
        out.push_str(&format!("  Created:     {created}\n"));
    }
    if let Some(updated) = task.updated_display() {
        out.push_str(&format!("  Updated:     {updated}\n"));
    }
    out
}

/// Pad to `width` terminal columns; longer text is left as is
fn pad(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - used))
    }
}
