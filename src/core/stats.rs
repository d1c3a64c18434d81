use std::collections::BTreeMap;

use serde::Serialize;
use time::{OffsetDateTime, macros::format_description};

use crate::core::{
    model::{MemberStatus, Project, ProjectStatus, TaskStatus},
    reducer::AppState,
    selectors,
};

const RECENT_ACTIVITY_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_tasks: usize,
    pub team_members: usize,
    pub budget: f64,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Created,
    Updated,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub action: ActivityKind,
    pub name: String,
    pub time: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_budget: f64,
    pub spent_budget: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u8,
    pub task_completion_rate: u8,
    pub budget_utilization: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub total_members: usize,
    pub active_members: usize,
    pub total_tasks: usize,
    pub total_projects: usize,
}

/// `round(100 * part / whole)`, or 0 when `whole` is 0.
pub fn rate(part: f64, whole: f64) -> u8 {
    if whole <= 0.0 {
        return 0;
    }
    (100.0 * part / whole).round().clamp(0.0, 255.0) as u8
}

struct ProjectTotals {
    total: usize,
    active: usize,
    completed: usize,
    budget: f64,
    spent: f64,
}

fn project_totals<'a>(projects: impl IntoIterator<Item = &'a Project>) -> ProjectTotals {
    projects.into_iter().fold(
        ProjectTotals {
            total: 0,
            active: 0,
            completed: 0,
            budget: 0.0,
            spent: 0.0,
        },
        |mut acc, project| {
            acc.total += 1;
            acc.active += usize::from(project.status == ProjectStatus::InProgress);
            acc.completed += usize::from(project.status == ProjectStatus::Completed);
            acc.budget += project.budget.unwrap_or(0.0);
            acc.spent += project.spent.unwrap_or(0.0);
            acc
        },
    )
}

pub fn dashboard_stats(state: &AppState, now: OffsetDateTime) -> DashboardStats {
    let totals = project_totals(state.projects.store.all());
    // The store already keeps projects newest first.
    let recent_activity = state
        .projects
        .store
        .all()
        .take(RECENT_ACTIVITY_LEN)
        .map(|project| Activity {
            action: match project.status {
                ProjectStatus::Completed => ActivityKind::Completed,
                ProjectStatus::Planning => ActivityKind::Created,
                _ => ActivityKind::Updated,
            },
            name: project.name.clone(),
            time: time_ago(project.updated_at, now),
            user: project.owner_name.clone(),
        })
        .collect();

    DashboardStats {
        total_projects: totals.total,
        active_projects: totals.active,
        completed_projects: totals.completed,
        total_tasks: state.tasks.store.total(),
        team_members: state.team.store.total(),
        budget: totals.budget,
        recent_activity,
    }
}

pub fn analytics_stats(state: &AppState) -> AnalyticsStats {
    let totals = project_totals(state.projects.store.all());
    let total_tasks = state.tasks.store.total();
    let completed_tasks = state
        .tasks
        .store
        .all()
        .filter(|task| task.is_completed())
        .count();

    AnalyticsStats {
        total_projects: totals.total,
        active_projects: totals.active,
        completed_projects: totals.completed,
        total_budget: totals.budget,
        spent_budget: totals.spent,
        total_tasks,
        completed_tasks,
        completion_rate: rate(totals.completed as f64, totals.total as f64),
        task_completion_rate: rate(completed_tasks as f64, total_tasks as f64),
        budget_utilization: rate(totals.spent, totals.budget),
    }
}

pub fn team_stats(state: &AppState) -> TeamStats {
    let members = selectors::select_members_with_counts(state);
    TeamStats {
        total_members: members.len(),
        active_members: members
            .iter()
            .filter(|member| member.status == MemberStatus::Active)
            .count(),
        total_tasks: members.iter().map(|member| member.tasks_count).sum(),
        total_projects: members.iter().map(|member| member.projects_count).sum(),
    }
}

/// Number of tasks per status. Every status is present, possibly with 0.
pub fn task_status_counts(state: &AppState) -> BTreeMap<TaskStatus, usize> {
    let mut counts: BTreeMap<_, _> = TaskStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for task in state.tasks.store.all() {
        *counts.entry(task.status).or_default() += 1;
    }
    counts
}

/// Humanized distance from `then` to `now`: "Just now", "3 hours ago",
/// "2 days ago", or the date once it is a week or more old.
pub fn time_ago(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let hours = (now - then).whole_hours();
    let days = hours / 24;
    match hours {
        ..1 => "Just now".to_string(),
        1 => "1 hour ago".to_string(),
        2..24 => format!("{hours} hours ago"),
        _ if days == 1 => "1 day ago".to_string(),
        _ if days < 7 => format!("{days} days ago"),
        _ => then
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| then.date().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        model::{MemberId, Priority, ProjectId, Task, TaskId},
        reducer::EntityState,
    };
    use time::macros::{date, datetime};

    fn project(name: &str, status: ProjectStatus, updated_at: OffsetDateTime) -> Project {
        Project {
            id: ProjectId::new_v4(),
            name: name.into(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            start_date: date!(2024-01-01),
            end_date: None,
            budget: Some(1000.0),
            spent: Some(250.0),
            progress: 0,
            owner_id: MemberId::new_v4(),
            owner_name: "John Doe".into(),
            team_members: vec![],
            created_at: updated_at,
            updated_at,
            tags: vec![],
        }
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            id: TaskId::new_v4(),
            title: "t".into(),
            description: String::new(),
            status,
            priority: Priority::Low,
            project_id: None,
            project_name: None,
            assignee_id: None,
            assignee_name: None,
            due_date: None,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
            tags: vec![],
        }
    }

    #[test]
    fn rate_is_zero_for_empty_whole() {
        assert_eq!(rate(3.0, 0.0), 0);
        assert_eq!(rate(1.0, 3.0), 33);
        assert_eq!(rate(2.0, 3.0), 67);
    }

    #[test]
    fn time_ago_buckets() {
        let now = datetime!(2024-06-10 12:00 UTC);
        assert_eq!(time_ago(datetime!(2024-06-10 11:30 UTC), now), "Just now");
        assert_eq!(time_ago(datetime!(2024-06-10 11:00 UTC), now), "1 hour ago");
        assert_eq!(time_ago(datetime!(2024-06-10 07:00 UTC), now), "5 hours ago");
        assert_eq!(time_ago(datetime!(2024-06-09 10:00 UTC), now), "1 day ago");
        assert_eq!(time_ago(datetime!(2024-06-06 12:00 UTC), now), "4 days ago");
        assert_eq!(time_ago(datetime!(2024-05-01 12:00 UTC), now), "2024-05-01");
    }

    #[test]
    fn dashboard_reports_four_newest_projects() {
        let now = datetime!(2024-06-10 12:00 UTC);
        let projects = vec![
            project("A", ProjectStatus::Completed, datetime!(2024-06-10 11:59 UTC)),
            project("B", ProjectStatus::Planning, datetime!(2024-06-10 09:00 UTC)),
            project("C", ProjectStatus::InProgress, datetime!(2024-06-08 12:00 UTC)),
            project("D", ProjectStatus::InProgress, datetime!(2024-06-01 12:00 UTC)),
            project("E", ProjectStatus::OnHold, datetime!(2024-05-01 12:00 UTC)),
        ];
        let state = AppState {
            projects: EntityState::with_records(projects),
            ..Default::default()
        };
        let stats = dashboard_stats(&state, now);

        assert_eq!(stats.total_projects, 5);
        assert_eq!(stats.active_projects, 2);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.budget, 5000.0);
        let names: Vec<_> = stats.recent_activity.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
        assert_eq!(stats.recent_activity[0].action, ActivityKind::Completed);
        assert_eq!(stats.recent_activity[1].action, ActivityKind::Created);
        assert_eq!(stats.recent_activity[1].time, "3 hours ago");
        assert_eq!(stats.recent_activity[2].action, ActivityKind::Updated);
    }

    #[test]
    fn analytics_rates() {
        let at = datetime!(2024-06-01 0:00 UTC);
        let state = AppState {
            projects: EntityState::with_records([
                project("A", ProjectStatus::Completed, at),
                project("B", ProjectStatus::InProgress, at),
            ]),
            tasks: EntityState::with_records([
                task(TaskStatus::Completed),
                task(TaskStatus::Todo),
                task(TaskStatus::Blocked),
            ]),
            ..Default::default()
        };
        let stats = analytics_stats(&state);
        assert_eq!(stats.completion_rate, 50);
        assert_eq!(stats.task_completion_rate, 33);
        assert_eq!(stats.budget_utilization, 25);

        let counts = task_status_counts(&state);
        assert_eq!(counts[&TaskStatus::Completed], 1);
        assert_eq!(counts[&TaskStatus::InProgress], 0);
        assert_eq!(counts.values().sum::<usize>(), 3);
    }

    #[test]
    fn empty_state_has_zero_rates() {
        let stats = analytics_stats(&AppState::default());
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.task_completion_rate, 0);
        assert_eq!(stats.budget_utilization, 0);
        assert_eq!(team_stats(&AppState::default()).total_members, 0);
    }
}
