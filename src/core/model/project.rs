use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::core::{
    action::{Action, EntityAction},
    entity::{Entity, EntityStore},
    model::{MemberId, Priority, matches_search},
    reducer::{AppState, EntityState},
    resource::{Filters, Resource, ResourceKind, merge_field},
};

uuid_id!(ProjectId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent: Option<f64>,
    /// Percentage of completed tasks, kept in step by progress propagation.
    pub progress: u8,
    pub owner_id: MemberId,
    pub owner_name: String,
    pub team_members: Vec<MemberId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub owner_id: MemberId,
    pub owner_name: String,
    pub team_members: Vec<MemberId>,
    pub tags: Vec<String>,
}

/// Partial changes to a project. Nested options distinguish "leave alone" from
/// "clear".
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub id: ProjectId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<Date>,
    pub end_date: Option<Option<Date>>,
    pub budget: Option<Option<f64>>,
    pub spent: Option<Option<f64>>,
    pub progress: Option<u8>,
    pub owner_id: Option<MemberId>,
    pub owner_name: Option<String>,
    pub team_members: Option<Vec<MemberId>>,
    pub tags: Option<Vec<String>>,
    pub updated_at: Option<OffsetDateTime>,
}

impl ProjectUpdate {
    pub fn new(id: ProjectId) -> Self {
        Self {
            id,
            name: None,
            description: None,
            status: None,
            priority: None,
            start_date: None,
            end_date: None,
            budget: None,
            spent: None,
            progress: None,
            owner_id: None,
            owner_name: None,
            team_members: None,
            tags: None,
            updated_at: None,
        }
    }

    /// The update progress propagation sends: only progress and timestamp.
    pub fn progress(id: ProjectId, progress: u8, now: OffsetDateTime) -> Self {
        Self {
            progress: Some(progress),
            updated_at: Some(now),
            ..Self::new(id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilters {
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
    pub owner_id: Option<MemberId>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFiltersUpdate {
    pub status: Option<Option<ProjectStatus>>,
    pub priority: Option<Option<Priority>>,
    pub search: Option<Option<String>>,
    pub owner_id: Option<Option<MemberId>>,
}

impl Filters for ProjectFilters {
    type Update = ProjectFiltersUpdate;

    fn merge(&self, update: &ProjectFiltersUpdate) -> Self {
        Self {
            status: merge_field(&self.status, &update.status),
            priority: merge_field(&self.priority, &update.priority),
            search: merge_field(&self.search, &update.search),
            owner_id: merge_field(&self.owner_id, &update.owner_id),
        }
    }
}

impl ProjectFilters {
    pub fn matches(&self, project: &Project) -> bool {
        self.status.is_none_or(|status| project.status == status)
            && self.priority.is_none_or(|priority| project.priority == priority)
            && self.owner_id.is_none_or(|owner| project.owner_id == owner)
            && self.search.as_deref().is_none_or(|needle| {
                matches_search(
                    needle,
                    [project.name.as_str(), project.description.as_str()]
                        .into_iter()
                        .chain(project.tags.iter().map(String::as_str)),
                )
            })
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn sort_cmp(a: &Self, b: &Self) -> Ordering {
        b.updated_at.cmp(&a.updated_at)
    }
}

impl Resource for Project {
    const KIND: ResourceKind = ResourceKind::Project;

    type New = NewProject;
    type Update = ProjectUpdate;
    type Filters = ProjectFilters;

    fn update_id(update: &ProjectUpdate) -> &ProjectId {
        &update.id
    }

    fn apply_update(&mut self, update: &ProjectUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(budget) = update.budget {
            self.budget = budget;
        }
        if let Some(spent) = update.spent {
            self.spent = spent;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(100);
        }
        if let Some(owner_id) = update.owner_id {
            self.owner_id = owner_id;
        }
        if let Some(owner_name) = &update.owner_name {
            self.owner_name = owner_name.clone();
        }
        if let Some(team_members) = &update.team_members {
            self.team_members = team_members.clone();
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = updated_at;
        }
    }

    fn from_new(id: ProjectId, new: NewProject, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            status: new.status,
            priority: new.priority,
            start_date: new.start_date,
            end_date: new.end_date,
            budget: new.budget,
            spent: new.spent,
            progress: 0,
            owner_id: new.owner_id,
            owner_name: new.owner_name,
            team_members: new.team_members,
            created_at: now,
            updated_at: now,
            tags: new.tags,
        }
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn next_id(_existing: &EntityStore<Self>, _last_issued: Option<&ProjectId>) -> ProjectId {
        ProjectId::new_v4()
    }

    fn lift(action: EntityAction<Self>) -> Action {
        Action::Projects(action)
    }

    fn slice(state: &AppState) -> &EntityState<Self> {
        &state.projects
    }
}
