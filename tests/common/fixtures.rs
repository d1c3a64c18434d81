use projectflow::core::{
    LatencyProfile, Store, StoreConfig, StoreHandle,
    model::{
        NewProject, NewTask, NewUser, Priority, Project, ProjectId, ProjectStatus, TaskStatus,
        TeamMember, UserRole,
    },
};
use time::macros::date;

/// Starts a store over the simulated backend with its default latencies.
/// Must be called inside a tokio runtime.
pub fn create_test_store() -> Store {
    Store::simulated(StoreConfig::default(), LatencyProfile::default())
}

/// Creates a NewProject owned by `owner`.
pub fn make_new_project(name: &str, owner: &TeamMember) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: format!("{name} description"),
        status: ProjectStatus::InProgress,
        priority: Priority::High,
        start_date: date!(2024-01-15),
        end_date: None,
        budget: Some(10_000.0),
        spent: Some(2_500.0),
        owner_id: owner.id,
        owner_name: owner.name.clone(),
        team_members: vec![],
        tags: vec!["test".to_string()],
    }
}

/// Creates a NewTask, optionally attached to a project.
pub fn make_new_task(title: &str, status: TaskStatus, project_id: Option<ProjectId>) -> NewTask {
    let mut task = NewTask::new(title, status);
    task.project_id = project_id;
    task
}

pub fn make_new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: UserRole::User,
    }
}

/// Creates a project through the store and waits for it to land.
pub async fn create_project(handle: &StoreHandle, name: &str, owner: &TeamMember) -> Project {
    handle.dispatch(projectflow::EntityAction::<Project>::Create(make_new_project(
        name, owner,
    )));
    handle.settled().await;
    handle
        .state()
        .projects
        .store
        .all()
        .find(|project| project.name == name)
        .cloned()
        .expect("project should have been created")
}

/// Progress of `project_id` in the current state.
pub fn progress_of(handle: &StoreHandle, project_id: ProjectId) -> Option<u8> {
    handle.select(|state| state.projects.store.get(&project_id).map(|p| p.progress))
}
