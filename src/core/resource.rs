use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;

use crate::core::{
    action::{Action, EntityAction},
    entity::{Entity, EntityStore},
    reducer::{AppState, EntityState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Task,
    TeamMember,
    User,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Project => "Project",
            ResourceKind::Task => "Task",
            ResourceKind::TeamMember => "Team",
            ResourceKind::User => "User",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub trait Filters: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    type Update: Clone + fmt::Debug + Send + Sync + 'static;

    fn merge(&self, update: &Self::Update) -> Self;
}

/// Applies one field of a filter update: `None` keeps, `Some(None)` clears,
/// `Some(Some(v))` sets.
pub(crate) fn merge_field<T: Clone>(current: &Option<T>, update: &Option<Option<T>>) -> Option<T> {
    match update {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

/// An entity kind that flows through actions, the reducer, effects and services.
pub trait Resource: Entity + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    const KIND: ResourceKind;

    /// Draft accepted by `create`. The service assigns id and timestamps.
    type New: Clone + fmt::Debug + Send + Sync + 'static;
    type Update: Clone + fmt::Debug + Send + Sync + 'static;
    type Filters: Filters;

    fn update_id(update: &Self::Update) -> &Self::Id;

    fn apply_update(&mut self, update: &Self::Update);

    fn from_new(id: Self::Id, new: Self::New, now: OffsetDateTime) -> Self;

    fn touch(&mut self, now: OffsetDateTime);

    /// Assigns an id for a new record. `last_issued` is the previous id handed
    /// out by the same service, which may not have reached the store yet.
    fn next_id(existing: &EntityStore<Self>, last_issued: Option<&Self::Id>) -> Self::Id;

    fn lift(action: EntityAction<Self>) -> Action;

    fn slice(state: &AppState) -> &EntityState<Self>;
}
