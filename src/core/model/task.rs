use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::core::{
    action::{Action, EntityAction},
    entity::{Entity, EntityStore},
    model::{MemberId, Priority, ProjectId, matches_search},
    reducer::{AppState, EntityState},
    resource::{Filters, Resource, ResourceKind, merge_field},
};

uuid_id!(TaskId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Completed,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Project name as it was when the task was created. Not refreshed on rename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub tags: Vec<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project_id: Option<ProjectId>,
    /// Left empty by callers; filled from the current project on create.
    pub project_name: Option<String>,
    pub assignee_id: Option<MemberId>,
    pub assignee_name: Option<String>,
    pub due_date: Option<Date>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            project_id: None,
            project_name: None,
            assignee_id: None,
            assignee_name: None,
            due_date: None,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<Option<ProjectId>>,
    pub project_name: Option<Option<String>>,
    pub assignee_id: Option<Option<MemberId>>,
    pub assignee_name: Option<Option<String>>,
    pub due_date: Option<Option<Date>>,
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            title: None,
            description: None,
            status: None,
            priority: None,
            project_id: None,
            project_name: None,
            assignee_id: None,
            assignee_name: None,
            due_date: None,
            tags: None,
        }
    }

    pub fn status(id: TaskId, status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::new(id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<ProjectId>,
    pub assignee_id: Option<MemberId>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFiltersUpdate {
    pub status: Option<Option<TaskStatus>>,
    pub priority: Option<Option<Priority>>,
    pub project_id: Option<Option<ProjectId>>,
    pub assignee_id: Option<Option<MemberId>>,
    pub search: Option<Option<String>>,
}

impl Filters for TaskFilters {
    type Update = TaskFiltersUpdate;

    fn merge(&self, update: &TaskFiltersUpdate) -> Self {
        Self {
            status: merge_field(&self.status, &update.status),
            priority: merge_field(&self.priority, &update.priority),
            project_id: merge_field(&self.project_id, &update.project_id),
            assignee_id: merge_field(&self.assignee_id, &update.assignee_id),
            search: merge_field(&self.search, &update.search),
        }
    }
}

impl TaskFilters {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self.priority.is_none_or(|priority| task.priority == priority)
            && self
                .project_id
                .is_none_or(|project| task.project_id == Some(project))
            && self
                .assignee_id
                .is_none_or(|assignee| task.assignee_id == Some(assignee))
            && self.search.as_deref().is_none_or(|needle| {
                matches_search(
                    needle,
                    [task.title.as_str(), task.description.as_str()]
                        .into_iter()
                        .chain(task.tags.iter().map(String::as_str)),
                )
            })
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn sort_cmp(a: &Self, b: &Self) -> Ordering {
        b.updated_at.cmp(&a.updated_at)
    }
}

impl Resource for Task {
    const KIND: ResourceKind = ResourceKind::Task;

    type New = NewTask;
    type Update = TaskUpdate;
    type Filters = TaskFilters;

    fn update_id(update: &TaskUpdate) -> &TaskId {
        &update.id
    }

    fn apply_update(&mut self, update: &TaskUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
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
        // A reassignment without a name drops the cached one.
        if let Some(project_id) = update.project_id {
            if project_id != self.project_id {
                self.project_name = None;
            }
            self.project_id = project_id;
        }
        if let Some(project_name) = &update.project_name {
            self.project_name = project_name.clone();
        }
        if let Some(assignee_id) = update.assignee_id {
            if assignee_id != self.assignee_id {
                self.assignee_name = None;
            }
            self.assignee_id = assignee_id;
        }
        if let Some(assignee_name) = &update.assignee_name {
            self.assignee_name = assignee_name.clone();
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(tags) = &update.tags {
            self.tags = tags.clone();
        }
    }

    fn from_new(id: TaskId, new: NewTask, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            project_id: new.project_id,
            project_name: new.project_name,
            assignee_id: new.assignee_id,
            assignee_name: new.assignee_name,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
            tags: new.tags,
        }
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn next_id(_existing: &EntityStore<Self>, _last_issued: Option<&TaskId>) -> TaskId {
        TaskId::new_v4()
    }

    fn lift(action: EntityAction<Self>) -> Action {
        Action::Tasks(action)
    }

    fn slice(state: &AppState) -> &EntityState<Self> {
        &state.tasks
    }
}
