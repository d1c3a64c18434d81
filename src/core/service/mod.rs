mod simulated;

use crate::core::{
    model::{Project, Task, TeamMember, User},
    resource::{Resource, ResourceKind},
};

pub use simulated::{LatencyProfile, SimulatedBackend, SimulatedService, StateReader, demo_team};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Update or delete aimed at a record that does not exist.
    #[error("Not Found: {kind} {id} does not exist")]
    NotFound { kind: ResourceKind, id: String },
    /// Domain failure (validation, 4xx). Never retried.
    #[error("Bad Request: {0}")]
    Rejected(String),
    /// Transport failure that outlived the transport's retries.
    #[error("Server Error: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn not_found<E: Resource>(id: &E::Id) -> Self {
        ServiceError::NotFound {
            kind: E::KIND,
            id: id.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Unavailable(_))
    }
}

/// Collaborator for one entity kind. Every call is asynchronous and settles
/// with either the resulting record or a [`ServiceError`].
pub trait Service<E: Resource>: Send + Sync + 'static {
    fn get_all(&self) -> impl Future<Output = Result<Vec<E>, ServiceError>> + Send;
    fn create(&self, new: E::New) -> impl Future<Output = Result<E, ServiceError>> + Send;
    fn update(&self, update: E::Update) -> impl Future<Output = Result<E, ServiceError>> + Send;
    fn delete(&self, id: E::Id) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

pub trait Backend: Send + Sync + 'static {
    type Projects: Service<Project>;
    type Tasks: Service<Task>;
    type Team: Service<TeamMember>;
    type Users: Service<User>;

    fn projects(&self) -> &Self::Projects;
    fn tasks(&self) -> &Self::Tasks;
    fn team(&self) -> &Self::Team;
    fn users(&self) -> &Self::Users;
}
