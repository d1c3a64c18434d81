mod fixtures;
mod scripted;
pub use fixtures::*;
pub use scripted::*;

// Re-export commonly used types from projectflow for tests
pub use projectflow::core::{
    AppState, EntityAction, LatencyProfile, NotificationLevel, ServiceError, Store, StoreConfig,
    StoreHandle,
    model::{
        MemberId, NewProject, NewTask, NewUser, Priority, Project, ProjectId, ProjectStatus,
        ProjectUpdate, Task, TaskId, TaskStatus, TaskUpdate, TeamMember, User, UserId, UserRole,
    },
    selectors::{select_all, select_total},
    service::demo_team,
};
