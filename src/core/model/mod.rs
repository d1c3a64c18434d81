use serde::{Deserialize, Serialize};

pub use project::{
    NewProject, Project, ProjectFilters, ProjectFiltersUpdate, ProjectId, ProjectStatus,
    ProjectUpdate,
};
pub use task::{NewTask, Task, TaskFilters, TaskFiltersUpdate, TaskId, TaskStatus, TaskUpdate};
pub use team::{
    MemberId, MemberStatus, NewTeamMember, TeamFilters, TeamFiltersUpdate, TeamMember,
    TeamMemberUpdate, TeamRole,
};
pub use user::{NewUser, User, UserFilters, UserFiltersUpdate, UserId, UserRole, UserUpdate};

/// Shared by projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new_v4() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

mod project;
mod task;
mod team;
mod user;

/// Case-insensitive substring match used by the search filters.
pub(crate) fn matches_search<'a>(needle: &str, haystack: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystack
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
