use std::collections::BTreeSet;

use time::OffsetDateTime;

use crate::core::{
    action::{Action, EntityAction},
    model::{NewTask, ProjectId, ProjectUpdate, Task, TaskUpdate},
    reducer::AppState,
};

/// Percentage of completed tasks, rounded half up. Zero for an empty project.
pub fn project_progress<'a>(tasks: impl IntoIterator<Item = &'a Task>, project_id: ProjectId) -> u8 {
    let (completed, total) = tasks
        .into_iter()
        .filter(|task| task.project_id == Some(project_id))
        .fold((0u64, 0u64), |(completed, total), task| {
            (completed + u64::from(task.is_completed()), total + 1)
        });
    if total == 0 {
        return 0;
    }
    ((200 * completed + total) / (2 * total)) as u8
}

/// Projects whose progress may have changed because of a settled task action.
pub fn affected_projects(action: &Action, prev: &AppState, next: &AppState) -> BTreeSet<ProjectId> {
    let Action::Tasks(action) = action else {
        return BTreeSet::new();
    };
    let mut affected = BTreeSet::new();
    match action {
        EntityAction::CreateSuccess(task) => affected.extend(task.project_id),
        EntityAction::UpdateSuccess(task) => {
            // A vanished task leaves the store untouched; nothing to recompute.
            let (Some(before), Some(after)) = (prev.tasks.store.get(&task.id), next.tasks.store.get(&task.id))
            else {
                return affected;
            };
            if before.status != after.status || before.project_id != after.project_id {
                affected.extend(before.project_id);
                affected.extend(after.project_id);
            }
        }
        EntityAction::DeleteSuccess(id) => {
            if let Some(task) = prev.tasks.store.get(id) {
                affected.extend(task.project_id);
            }
        }
        _ => {}
    }
    affected
}

/// Progress updates to dispatch after `action`. Projects missing from `next`
/// are skipped.
pub fn plan(action: &Action, prev: &AppState, next: &AppState, now: OffsetDateTime) -> Vec<ProjectUpdate> {
    affected_projects(action, prev, next)
        .into_iter()
        .filter_map(|project_id| {
            if !next.projects.store.contains(&project_id) {
                tracing::debug!(%project_id, "skipping progress for unknown project");
                return None;
            }
            let progress = project_progress(next.tasks.store.all(), project_id);
            tracing::debug!(%project_id, progress, "recomputed project progress");
            Some(ProjectUpdate::progress(project_id, progress, now))
        })
        .collect()
}

/// Fills the denormalized names on a task draft from the current state.
/// Names the caller already set are kept.
pub fn resolve_task_references(mut new: NewTask, state: &AppState) -> NewTask {
    if new.project_name.is_none() {
        new.project_name = new
            .project_id
            .and_then(|id| state.projects.store.get(&id))
            .map(|project| project.name.clone());
    }
    if new.assignee_name.is_none() {
        new.assignee_name = new
            .assignee_id
            .and_then(|id| state.team.store.get(&id))
            .map(|member| member.name.clone());
    }
    new
}

/// Same as [`resolve_task_references`] for an update that moves the task to
/// another project or assignee. Unchanged references are left alone.
pub fn resolve_task_update_references(mut update: TaskUpdate, state: &AppState) -> TaskUpdate {
    let current = state.tasks.store.get(&update.id);
    if update.project_name.is_none()
        && let Some(project_id) = update.project_id
        && current.is_none_or(|task| task.project_id != project_id)
    {
        update.project_name = Some(
            project_id
                .and_then(|id| state.projects.store.get(&id))
                .map(|project| project.name.clone()),
        );
    }
    if update.assignee_name.is_none()
        && let Some(assignee_id) = update.assignee_id
        && current.is_none_or(|task| task.assignee_id != assignee_id)
    {
        update.assignee_name = Some(
            assignee_id
                .and_then(|id| state.team.store.get(&id))
                .map(|member| member.name.clone()),
        );
    }
    update
}
