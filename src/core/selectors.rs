use crate::core::{
    entity::Entity,
    model::{Project, ProjectId, Task, TeamMember, User},
    reducer::AppState,
    resource::Resource,
};

pub fn select_all<E: Resource>(state: &AppState) -> Vec<E> {
    E::slice(state).store.all().cloned().collect()
}

pub fn select_entities<E: Resource>(state: &AppState) -> im::HashMap<E::Id, E> {
    E::slice(state).store.entities().clone()
}

pub fn select_ids<E: Resource>(state: &AppState) -> Vec<E::Id> {
    E::slice(state).store.ids().iter().cloned().collect()
}

pub fn select_total<E: Resource>(state: &AppState) -> usize {
    E::slice(state).store.total()
}

pub fn select_loading<E: Resource>(state: &AppState) -> bool {
    E::slice(state).loading
}

pub fn select_error<E: Resource>(state: &AppState) -> Option<String> {
    E::slice(state).error.clone()
}

pub fn select_filters<E: Resource>(state: &AppState) -> E::Filters {
    E::slice(state).filters.clone()
}

pub fn select_selected_id<E: Resource>(state: &AppState) -> Option<E::Id> {
    E::slice(state).selected_id.clone()
}

/// The selected record, if the selection still resolves.
pub fn select_selected<E: Resource>(state: &AppState) -> Option<E> {
    let slice = E::slice(state);
    slice
        .selected_id
        .as_ref()
        .and_then(|id| slice.store.get(id))
        .cloned()
}

pub fn select_filtered_projects(state: &AppState) -> Vec<Project> {
    let filters = &state.projects.filters;
    state
        .projects
        .store
        .all()
        .filter(|project| filters.matches(project))
        .cloned()
        .collect()
}

pub fn select_filtered_tasks(state: &AppState) -> Vec<Task> {
    let filters = &state.tasks.filters;
    state
        .tasks
        .store
        .all()
        .filter(|task| filters.matches(task))
        .cloned()
        .collect()
}

pub fn select_tasks_for_project(state: &AppState, project_id: ProjectId) -> Vec<Task> {
    state
        .tasks
        .store
        .all()
        .filter(|task| task.project_id == Some(project_id))
        .cloned()
        .collect()
}

pub fn select_filtered_users(state: &AppState) -> Vec<User> {
    let filters = &state.users.filters;
    state
        .users
        .store
        .all()
        .filter(|user| filters.matches(user))
        .cloned()
        .collect()
}

/// Team members with `tasks_count` and `projects_count` filled in.
///
/// Tasks are joined on `assignee_id`, never on the display name. A member
/// counts toward a project when listed in its team or as its owner.
pub fn select_members_with_counts(state: &AppState) -> Vec<TeamMember> {
    state
        .team
        .store
        .all()
        .map(|member| {
            let id = member.id();
            let tasks_count = state
                .tasks
                .store
                .all()
                .filter(|task| task.assignee_id.as_ref() == Some(id))
                .count();
            let projects_count = state
                .projects
                .store
                .all()
                .filter(|project| project.owner_id == *id || project.team_members.contains(id))
                .count();
            TeamMember {
                tasks_count,
                projects_count,
                ..member.clone()
            }
        })
        .collect()
}

pub fn select_filtered_members(state: &AppState) -> Vec<TeamMember> {
    let filters = &state.team.filters;
    select_members_with_counts(state)
        .into_iter()
        .filter(|member| filters.matches(member))
        .collect()
}
