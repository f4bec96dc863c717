use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;

use crate::cli::{AddArgs, CliCommand, EditArgs, ListArgs, StatsArgs};
use crate::core::app::{AppState, Dashboard};
use crate::core::parser::parse_due_date_from;
use crate::core::session::Credentials;
use crate::model::{TaskDraft, TaskId, TaskPatch};
use crate::render;

pub async fn execute<W: Write>(
    app: &mut AppState,
    command: CliCommand,
    today: NaiveDate,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::Login(args) => {
            let password = resolve_password(args.password)?;
            let credentials = Credentials::login(args.email, password);
            let session = app.authenticate(&credentials).await?;
            writeln!(writer, "Signed in as {}", session.user_name)?;
        }
        CliCommand::Signup(args) => {
            let password = resolve_password(args.password)?;
            let credentials = Credentials::signup(args.name, args.email, password);
            let session = app.authenticate(&credentials).await?;
            writeln!(writer, "Account created. Signed in as {}", session.user_name)?;
        }
        CliCommand::Logout => {
            if app.session().is_none() {
                writeln!(writer, "Not signed in")?;
            } else {
                app.logout().await;
                writeln!(writer, "Signed out")?;
            }
        }
        CliCommand::Whoami => match app.session() {
            Some(session) => writeln!(writer, "{}", session.user_name)?,
            None => writeln!(writer, "Not signed in")?,
        },
        CliCommand::List(args) => {
            let mut dashboard = app.dashboard()?;
            handle_list(&mut dashboard, &args, today, &mut writer).await?;
        }
        CliCommand::Show(args) => {
            let mut dashboard = app.dashboard()?;
            let id = load_and_resolve(&mut dashboard, &args.id).await?;
            if let Some(task) = dashboard.board().get(&id) {
                write!(writer, "{}", render::task_detail(task, today))?;
            }
        }
        CliCommand::Add(args) => {
            let mut dashboard = app.dashboard()?;
            let draft = draft_from_args(args, today)?;
            let task = dashboard.add(&draft).await?;
            writeln!(writer, "Added {}  {}", render::short_id(&task.id), task.title)?;
        }
        CliCommand::Edit(args) => {
            let mut dashboard = app.dashboard()?;
            let id = load_and_resolve(&mut dashboard, &args.id).await?;
            let patch = patch_from_args(&args, today)?;
            if patch.is_empty() {
                bail!("Nothing to change: pass at least one field to edit");
            }
            let task = dashboard.update(&id, &patch).await?;
            writeln!(writer, "Updated {}", render::task_line(&task, today))?;
        }
        CliCommand::Toggle(args) => {
            let mut dashboard = app.dashboard()?;
            let id = load_and_resolve(&mut dashboard, &args.id).await?;
            let task = dashboard.toggle(&id).await?;
            let verb = if task.completed { "Completed" } else { "Reopened" };
            writeln!(writer, "{} {}  {}", verb, render::short_id(&task.id), task.title)?;
        }
        CliCommand::Delete(args) => {
            let mut dashboard = app.dashboard()?;
            let id = load_and_resolve(&mut dashboard, &args.id).await?;
            dashboard.remove(&id).await?;
            writeln!(writer, "Deleted {}", id)?;
        }
        CliCommand::Stats(args) => {
            let mut dashboard = app.dashboard()?;
            handle_stats(&mut dashboard, &args, &mut writer).await?;
        }
    }
    Ok(())
}

async fn handle_list<W: Write>(
    dashboard: &mut Dashboard<'_>,
    args: &ListArgs,
    today: NaiveDate,
    mut writer: W,
) -> Result<()> {
    dashboard.load().await.context("Failed to load tasks")?;
    let visible = dashboard.visible(args.filter, args.sort, today);

    if args.json {
        serde_json::to_writer_pretty(&mut writer, &visible)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "{}", render::stats_line(&dashboard.stats()))?;
    if visible.is_empty() {
        writeln!(writer, "No {} tasks", args.filter)?;
    }
    for task in &visible {
        writeln!(writer, "{}", render::task_line(task, today))?;
    }
    Ok(())
}

async fn handle_stats<W: Write>(
    dashboard: &mut Dashboard<'_>,
    args: &StatsArgs,
    mut writer: W,
) -> Result<()> {
    dashboard.load().await.context("Failed to load tasks")?;
    let stats = dashboard.stats();
    if args.json {
        serde_json::to_writer_pretty(&mut writer, &stats)?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "{}", render::stats_line(&stats))?;
    }
    Ok(())
}

async fn load_and_resolve(dashboard: &mut Dashboard<'_>, prefix: &str) -> Result<TaskId> {
    dashboard.load().await.context("Failed to load tasks")?;
    Ok(dashboard.resolve_id(prefix)?)
}

fn draft_from_args(args: AddArgs, today: NaiveDate) -> Result<TaskDraft> {
    let mut draft = TaskDraft::new(args.title.join(" "));
    draft.description = args.description.filter(|d| !d.trim().is_empty());
    if let Some(priority) = args.priority {
        draft.priority = priority;
    }
    if let Some(color) = args.color {
        draft.color = color;
    }
    draft.due_date = args
        .due
        .as_deref()
        .map(|spec| parse_due_date_from(spec, today))
        .transpose()?;
    Ok(draft)
}

fn patch_from_args(args: &EditArgs, today: NaiveDate) -> Result<TaskPatch> {
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.clone().map(Some)
    };
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due
            .as_deref()
            .map(|spec| parse_due_date_from(spec, today).map(Some))
            .transpose()?
    };
    Ok(TaskPatch {
        title: args.title.clone(),
        description,
        color: args.color,
        due_date,
        priority: args.priority,
        completed: None,
    })
}

fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow!("A password is required"));
    }
    Ok(password)
}
