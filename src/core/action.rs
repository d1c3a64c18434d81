use crate::core::{
    model::{Project, Task, TeamMember, User},
    resource::{Filters, Resource, ResourceKind},
    service::ServiceError,
};

/// Every intent and outcome for one entity kind.
#[derive(Debug, Clone)]
pub enum EntityAction<E: Resource> {
    Load,
    LoadSuccess(Vec<E>),
    LoadFailure(ServiceError),

    Create(E::New),
    CreateSuccess(E),
    CreateFailure(ServiceError),

    Update(E::Update),
    UpdateSuccess(E),
    UpdateFailure(ServiceError),

    Delete(E::Id),
    DeleteSuccess(E::Id),
    DeleteFailure(ServiceError),

    Select(Option<E::Id>),
    SetFilters(<E::Filters as Filters>::Update),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Requested,
    Succeeded,
    Failed,
    /// Synchronous state-only actions (`Select`, `SetFilters`).
    Local,
}

impl<E: Resource> EntityAction<E> {
    pub fn phase(&self) -> Phase {
        match self {
            EntityAction::Load
            | EntityAction::Create(_)
            | EntityAction::Update(_)
            | EntityAction::Delete(_) => Phase::Requested,
            EntityAction::LoadSuccess(_)
            | EntityAction::CreateSuccess(_)
            | EntityAction::UpdateSuccess(_)
            | EntityAction::DeleteSuccess(_) => Phase::Succeeded,
            EntityAction::LoadFailure(_)
            | EntityAction::CreateFailure(_)
            | EntityAction::UpdateFailure(_)
            | EntityAction::DeleteFailure(_) => Phase::Failed,
            EntityAction::Select(_) | EntityAction::SetFilters(_) => Phase::Local,
        }
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            EntityAction::LoadFailure(err)
            | EntityAction::CreateFailure(err)
            | EntityAction::UpdateFailure(err)
            | EntityAction::DeleteFailure(err) => Some(err),
            _ => None,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            EntityAction::Load => "Load",
            EntityAction::LoadSuccess(_) => "Load Success",
            EntityAction::LoadFailure(_) => "Load Failure",
            EntityAction::Create(_) => "Create",
            EntityAction::CreateSuccess(_) => "Create Success",
            EntityAction::CreateFailure(_) => "Create Failure",
            EntityAction::Update(_) => "Update",
            EntityAction::UpdateSuccess(_) => "Update Success",
            EntityAction::UpdateFailure(_) => "Update Failure",
            EntityAction::Delete(_) => "Delete",
            EntityAction::DeleteSuccess(_) => "Delete Success",
            EntityAction::DeleteFailure(_) => "Delete Failure",
            EntityAction::Select(_) => "Select",
            EntityAction::SetFilters(_) => "Set Filters",
        }
    }

    /// Log-friendly type tag, e.g. `[Project] Create Success`.
    pub fn name(&self) -> String {
        format!("[{}] {}", E::KIND, self.verb())
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Projects(EntityAction<Project>),
    Tasks(EntityAction<Task>),
    Team(EntityAction<TeamMember>),
    Users(EntityAction<User>),
}

impl Action {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Action::Projects(_) => ResourceKind::Project,
            Action::Tasks(_) => ResourceKind::Task,
            Action::Team(_) => ResourceKind::TeamMember,
            Action::Users(_) => ResourceKind::User,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Action::Projects(action) => action.name(),
            Action::Tasks(action) => action.name(),
            Action::Team(action) => action.name(),
            Action::Users(action) => action.name(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Action::Projects(action) => action.phase(),
            Action::Tasks(action) => action.phase(),
            Action::Team(action) => action.phase(),
            Action::Users(action) => action.phase(),
        }
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            Action::Projects(action) => action.error(),
            Action::Tasks(action) => action.error(),
            Action::Team(action) => action.error(),
            Action::Users(action) => action.error(),
        }
    }
}

impl From<EntityAction<Project>> for Action {
    fn from(action: EntityAction<Project>) -> Self {
        Action::Projects(action)
    }
}

impl From<EntityAction<Task>> for Action {
    fn from(action: EntityAction<Task>) -> Self {
        Action::Tasks(action)
    }
}

impl From<EntityAction<TeamMember>> for Action {
    fn from(action: EntityAction<TeamMember>) -> Self {
        Action::Team(action)
    }
}

impl From<EntityAction<User>> for Action {
    fn from(action: EntityAction<User>) -> Self {
        Action::Users(action)
    }
}
