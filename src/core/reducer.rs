use crate::core::{
    action::{Action, EntityAction},
    entity::EntityStore,
    model::{Project, Task, TeamMember, User},
    resource::{Filters, Resource, ResourceKind},
};

/// State of one entity kind: the normalized records plus request bookkeeping.
#[derive(Debug, Clone)]
pub struct EntityState<E: Resource> {
    pub store: EntityStore<E>,
    pub selected_id: Option<E::Id>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: E::Filters,
}

impl<E: Resource> Default for EntityState<E> {
    fn default() -> Self {
        Self {
            store: EntityStore::new(),
            selected_id: None,
            loading: false,
            error: None,
            filters: E::Filters::default(),
        }
    }
}

impl<E: Resource> EntityState<E> {
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        Self {
            store: EntityStore::from_records(records),
            ..Self::default()
        }
    }

    fn requested(&self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self.clone()
        }
    }

    fn succeeded(&self, store: EntityStore<E>) -> Self {
        Self {
            store,
            loading: false,
            error: None,
            ..self.clone()
        }
    }

    fn failed(&self, message: String) -> Self {
        Self {
            loading: false,
            error: Some(message),
            ..self.clone()
        }
    }

    /// Computes the next state. Never mutates `self`.
    pub fn reduce(&self, action: &EntityAction<E>) -> Self {
        match action {
            EntityAction::Load
            | EntityAction::Create(_)
            | EntityAction::Update(_)
            | EntityAction::Delete(_) => self.requested(),

            EntityAction::LoadSuccess(records) => {
                self.succeeded(self.store.set_all(records.iter().cloned()))
            }
            EntityAction::CreateSuccess(record) => self.succeeded(self.store.add_one(record.clone())),
            EntityAction::UpdateSuccess(record) => {
                match self.store.update_one(record.id(), |current| *current = record.clone()) {
                    Ok(store) => self.succeeded(store),
                    Err(err) => {
                        tracing::warn!(kind = %E::KIND, %err, "update settled for a record no longer in the store");
                        self.failed(err.to_string())
                    }
                }
            }
            EntityAction::DeleteSuccess(id) => {
                let mut next = self.succeeded(self.store.remove_one(id));
                if next.selected_id.as_ref() == Some(id) {
                    next.selected_id = None;
                }
                next
            }

            EntityAction::LoadFailure(err)
            | EntityAction::CreateFailure(err)
            | EntityAction::UpdateFailure(err)
            | EntityAction::DeleteFailure(err) => self.failed(err.to_string()),

            EntityAction::Select(id) => Self {
                selected_id: id.clone(),
                ..self.clone()
            },
            EntityAction::SetFilters(update) => Self {
                filters: self.filters.merge(update),
                ..self.clone()
            },
        }
    }
}

/// The whole dashboard state tree.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub projects: EntityState<Project>,
    pub tasks: EntityState<Task>,
    pub team: EntityState<TeamMember>,
    pub users: EntityState<User>,
}

impl AppState {
    pub fn error(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::Project => self.projects.error.as_deref(),
            ResourceKind::Task => self.tasks.error.as_deref(),
            ResourceKind::TeamMember => self.team.error.as_deref(),
            ResourceKind::User => self.users.error.as_deref(),
        }
    }

    pub fn reduce(&self, action: &Action) -> Self {
        match action {
            Action::Projects(action) => Self {
                projects: self.projects.reduce(action),
                ..self.clone()
            },
            Action::Tasks(action) => Self {
                tasks: self.tasks.reduce(action),
                ..self.clone()
            },
            Action::Team(action) => Self {
                team: self.team.reduce(action),
                ..self.clone()
            },
            Action::Users(action) => Self {
                users: self.users.reduce(action),
                ..self.clone()
            },
        }
    }
}
