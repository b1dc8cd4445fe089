use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tododash_core::time::{format_date, format_deadline};
use tododash_core::{
    task_badge, BadgeKind, FormField, ListQuery, StatusFilter, Task, TaskForm, TaskId, TaskStatus,
    TodoApi,
};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    badge: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
    #[tabled(rename = "Created")]
    created: String,
}

pub struct EditArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
}

fn parse_status(input: &str) -> Result<TaskStatus> {
    TaskStatus::parse(input)
        .ok_or_else(|| anyhow!("Unknown status '{}': use pending, in-progress or completed", input))
}

pub async fn list(api: &dyn TodoApi, page: u32, limit: u32, status: &str) -> Result<()> {
    let filter = StatusFilter::parse(status)
        .ok_or_else(|| anyhow!("Unknown status filter '{}'", status))?;
    let result = api
        .list_tasks(&ListQuery::new(page.max(1), limit, filter))
        .await
        .map_err(|e| anyhow!("Failed to load todos: {}", e))?;

    if result.items.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let now = Utc::now();
    let mut overdue_rows = Vec::new();
    let rows: Vec<TaskRow> = result
        .items
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let badge = task_badge(task, now);
            if badge.kind == BadgeKind::Overdue {
                overdue_rows.push(i + 1);
            }
            TaskRow {
                id: task.id.to_string(),
                title: task.title.clone(),
                badge: badge.label.to_string(),
                deadline: format_deadline(task.deadline),
                created: format_date(task.created_at),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    for row in overdue_rows {
        table.with(Modify::new(Rows::one(row)).with(Color::FG_RED));
    }
    println!("{}", table);

    let total = result.pagination.total.unwrap_or(result.items.len() as u64);
    let total_pages = result.pagination.total_pages.unwrap_or(1);
    println!("Page {} of {} • {} total tasks", page.max(1), total_pages, total);
    Ok(())
}

fn print_task(task: &Task) {
    let badge = task_badge(task, Utc::now());
    println!("{}  [{}]", task.title, badge.label);
    println!("  ID:          {}", task.id);
    println!("  Status:      {}", task.status.label());
    println!("  Deadline:    {}", format_deadline(task.deadline));
    if badge.kind == BadgeKind::Overdue {
        println!("               OVERDUE - NEEDS ATTENTION");
    }
    println!("  Created:     {}", format_date(task.created_at));
    println!("  Updated:     {}", format_date(task.updated_at));
    println!();
    println!("  {}", task.description);
}

pub async fn show(api: &dyn TodoApi, id: &str) -> Result<()> {
    let task = api
        .get_task(&TaskId::new(id))
        .await
        .map_err(|e| anyhow!("{}", e))?;
    print_task(&task);
    Ok(())
}

pub async fn add(
    api: &dyn TodoApi,
    title: String,
    description: String,
    deadline: String,
    status: &str,
) -> Result<()> {
    let form = TaskForm {
        title,
        description,
        deadline,
        status: parse_status(status)?,
        ..TaskForm::default()
    };
    let draft = form.validate().map_err(|e| anyhow!(e.submit_message()))?;
    let task = api
        .create_task(&draft)
        .await
        .map_err(|e| anyhow!(e.submit_message()))?;
    println!("Todo created successfully");
    print_task(&task);
    Ok(())
}

/// Full replace: the current record seeds every field the caller left out.
pub async fn edit(api: &dyn TodoApi, id: &str, changes: EditArgs) -> Result<()> {
    let id = TaskId::new(id);
    let current = api.get_task(&id).await.map_err(|e| anyhow!("{}", e))?;
    let mut form = TaskForm::from_task(&current);

    if let Some(title) = changes.title {
        form.set_field(FormField::Title, &title);
    }
    if let Some(description) = changes.description {
        form.set_field(FormField::Description, &description);
    }
    if let Some(deadline) = changes.deadline {
        form.set_field(FormField::Deadline, &deadline);
    }
    if let Some(status) = changes.status {
        form.status = parse_status(&status)?;
    }

    let draft = form.validate().map_err(|e| anyhow!(e.submit_message()))?;
    let task = api
        .update_task(&id, &draft)
        .await
        .map_err(|e| anyhow!(e.submit_message()))?;
    println!("Todo updated successfully");
    print_task(&task);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn delete(api: &dyn TodoApi, id: &str, yes: bool) -> Result<()> {
    let id = TaskId::new(id);
    if id.is_empty() {
        bail!("Cannot delete: No ID found");
    }
    if !yes && !confirm("Are you sure you want to delete this todo?")? {
        println!("Cancelled.");
        return Ok(());
    }
    api.delete_task(&id)
        .await
        .map_err(|e| anyhow!(e.delete_message()))?;
    println!("Todo deleted successfully");
    Ok(())
}

pub async fn stats(api: &dyn TodoApi) -> Result<()> {
    let stats = api.stats().await.map_err(|e| anyhow!("{}", e))?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub async fn ping(api: &dyn TodoApi, base_url: &str) -> Result<()> {
    api.ping()
        .await
        .map_err(|e| anyhow!("{} is not reachable: {}", base_url, e))?;
    println!("{} is reachable", base_url);
    Ok(())
}
