use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use time::{OffsetDateTime, macros::date};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use projectflow::core::{
    AppState, EntityAction, LatencyProfile, Store, StoreConfig, StoreHandle,
    model::{
        NewProject, NewTask, NewUser, Priority, Project, ProjectStatus, Task, TaskStatus, TaskUpdate,
        TeamMember, User, UserRole,
    },
    selectors,
    stats::{self, DashboardStats},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Parser)]
#[command(name = "projectflow")]
#[command(about = "Run a scripted dashboard session against the simulated backend")]
struct Cli {
    /// Simulated latency for every service call, in milliseconds
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Print the final views as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormat,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_env("PROJECTFLOW_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "projectflow=debug,info"
        } else {
            "projectflow=info,warn"
        })
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose, args.log_format);

    let latency = args
        .latency_ms
        .map(|ms| LatencyProfile::uniform(Duration::from_millis(ms)))
        .unwrap_or_default();
    let store = Store::simulated(StoreConfig::default(), latency);
    let handle = store.handle();

    let mut notifications = handle.notifications();
    let notices = tokio::spawn(async move {
        while let Ok(notice) = notifications.recv().await {
            eprintln!("! [{}] {}", notice.kind, notice.message);
        }
    });

    run_session(&handle).await?;

    let state = handle.state();
    if args.json {
        let views = serde_json::json!({
            "dashboard": stats::dashboard_stats(&state, OffsetDateTime::now_utc()),
            "analytics": stats::analytics_stats(&state),
            "team": stats::team_stats(&state),
            "taskStatus": stats::task_status_counts(&state),
            "projects": selectors::select_all::<Project>(&state),
            "members": selectors::select_members_with_counts(&state),
        });
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print_views(&state);
    }

    store.shutdown().await;
    notices.abort();
    Ok(())
}

/// Loads every collection, then creates and edits a project with a few tasks.
async fn run_session(handle: &StoreHandle) -> anyhow::Result<()> {
    tracing::info!("loading collections");
    handle.dispatch(EntityAction::<Project>::Load);
    handle.dispatch(EntityAction::<Task>::Load);
    handle.dispatch(EntityAction::<TeamMember>::Load);
    handle.dispatch(EntityAction::<User>::Load);
    handle.settled().await;

    let team = handle.select(selectors::select_all::<TeamMember>);
    let owner = team.first().context("simulated team is empty")?;

    handle.dispatch(EntityAction::<Project>::Create(NewProject {
        name: "Website Redesign".into(),
        description: "Refresh the public site and move it to the new design system".into(),
        status: ProjectStatus::InProgress,
        priority: Priority::High,
        start_date: date!(2024-01-15),
        end_date: Some(date!(2024-06-30)),
        budget: Some(50_000.0),
        spent: Some(12_500.0),
        owner_id: owner.id,
        owner_name: owner.name.clone(),
        team_members: team.iter().skip(1).map(|member| member.id).collect(),
        tags: vec!["web".into(), "design".into()],
    }));
    handle.dispatch(EntityAction::<User>::Create(NewUser {
        name: "Alice Admin".into(),
        email: "alice@projectflow.io".into(),
        role: UserRole::Admin,
    }));
    handle.settled().await;

    let project_id = handle
        .select(selectors::select_all::<Project>)
        .first()
        .map(|project| project.id)
        .context("project was not created")?;

    let _progress = handle.subscribe(
        move |state: &AppState| state.projects.store.get(&project_id).map(|p| p.progress),
        |progress| {
            if let Some(progress) = progress {
                tracing::info!(progress, "project progress");
            }
        },
    );

    let drafts = [
        ("Audit current pages", TaskStatus::Completed),
        ("Build component library", TaskStatus::InProgress),
        ("Migrate blog", TaskStatus::Todo),
    ];
    for (title, status) in drafts {
        let mut task = NewTask::new(title, status);
        task.project_id = Some(project_id);
        task.assignee_id = team.get(1).map(|member| member.id);
        handle.dispatch(EntityAction::<Task>::Create(task));
    }
    handle.settled().await;

    let in_progress = handle
        .select(selectors::select_all::<Task>)
        .into_iter()
        .find(|task| task.status == TaskStatus::InProgress)
        .context("task was not created")?;
    handle.dispatch(EntityAction::<Task>::Update(TaskUpdate::status(
        in_progress.id,
        TaskStatus::Completed,
    )));
    handle.settled().await;

    Ok(())
}

fn print_views(state: &AppState) {
    let DashboardStats {
        total_projects,
        active_projects,
        completed_projects,
        total_tasks,
        team_members,
        budget,
        recent_activity,
    } = stats::dashboard_stats(state, OffsetDateTime::now_utc());

    println!("\n=== Dashboard ===");
    println!("Projects: {total_projects} ({active_projects} active, {completed_projects} completed)");
    println!("Tasks: {total_tasks}");
    println!("Team members: {team_members}");
    println!("Budget: {budget:.2}");
    for activity in recent_activity {
        println!(
            "  {} {:?} by {} ({})",
            activity.name, activity.action, activity.user, activity.time
        );
    }

    let analytics = stats::analytics_stats(state);
    println!("\n=== Analytics ===");
    println!("Project completion: {}%", analytics.completion_rate);
    println!("Task completion: {}%", analytics.task_completion_rate);
    println!("Budget utilization: {}%", analytics.budget_utilization);
    for (status, count) in stats::task_status_counts(state) {
        println!("  {status:?}: {count}");
    }

    let team = stats::team_stats(state);
    println!("\n=== Team ===");
    println!(
        "{} members ({} active), {} assigned tasks",
        team.total_members, team.active_members, team.total_tasks
    );
    for member in selectors::select_members_with_counts(state) {
        println!(
            "  {:<14} {:>2} projects {:>2} tasks",
            member.name, member.projects_count, member.tasks_count
        );
    }

    for project in state.projects.store.all() {
        println!("\n{} - {}% complete", project.name, project.progress);
    }

    println!("\n=== Users ===");
    for user in state.users.store.all() {
        println!("  #{} {} <{}> {:?}", user.id, user.name, user.email, user.role);
    }
}
