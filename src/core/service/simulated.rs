use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use time::{OffsetDateTime, macros::datetime};
use tokio::sync::watch;

use crate::core::{
    model::{MemberId, MemberStatus, Project, Task, TeamMember, TeamRole, User},
    reducer::AppState,
    resource::Resource,
    service::{Backend, Service, ServiceError},
};

/// Read-only view of the canonical state, handed to collaborators.
#[derive(Debug, Clone)]
pub struct StateReader {
    rx: watch::Receiver<Arc<AppState>>,
}

impl StateReader {
    pub(crate) fn new(rx: watch::Receiver<Arc<AppState>>) -> Self {
        Self { rx }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        self.rx.borrow().clone()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LatencyProfile {
    pub read: Duration,
    pub create: Duration,
    pub write: Duration,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(300),
            create: Duration::from_millis(500),
            write: Duration::from_millis(300),
        }
    }
}

impl LatencyProfile {
    pub fn uniform(latency: Duration) -> Self {
        Self {
            read: latency,
            create: latency,
            write: latency,
        }
    }
}

/// Stand-in for a remote API. Holds no records of its own.
pub struct SimulatedService<E: Resource> {
    state: StateReader,
    latency: LatencyProfile,
    seed: Vec<E>,
    last_issued: Mutex<Option<E::Id>>,
}

impl<E: Resource> SimulatedService<E> {
    pub fn new(state: StateReader, latency: LatencyProfile) -> Self {
        Self {
            state,
            latency,
            seed: Vec::new(),
            last_issued: Mutex::new(None),
        }
    }

    /// Records returned by `get_all` while the canonical collection is empty.
    pub fn with_seed(mut self, seed: Vec<E>) -> Self {
        self.seed = seed;
        self
    }

    fn issue_id(&self) -> E::Id {
        let snapshot = self.state.snapshot();
        let mut last = self.last_issued.lock().unwrap_or_else(PoisonError::into_inner);
        let id = E::next_id(&E::slice(&snapshot).store, last.as_ref());
        *last = Some(id.clone());
        id
    }
}

impl<E: Resource> Service<E> for SimulatedService<E> {
    async fn get_all(&self) -> Result<Vec<E>, ServiceError> {
        tokio::time::sleep(self.latency.read).await;
        let snapshot = self.state.snapshot();
        let store = &E::slice(&snapshot).store;
        if store.is_empty() {
            Ok(self.seed.clone())
        } else {
            Ok(store.all().cloned().collect())
        }
    }

    async fn create(&self, new: E::New) -> Result<E, ServiceError> {
        let id = self.issue_id();
        tokio::time::sleep(self.latency.create).await;
        Ok(E::from_new(id, new, OffsetDateTime::now_utc()))
    }

    async fn update(&self, update: E::Update) -> Result<E, ServiceError> {
        tokio::time::sleep(self.latency.write).await;
        let snapshot = self.state.snapshot();
        let id = E::update_id(&update);
        let Some(current) = E::slice(&snapshot).store.get(id) else {
            tracing::debug!(kind = %E::KIND, %id, "simulated update for unknown id");
            return Err(ServiceError::not_found::<E>(id));
        };
        let mut record = current.clone();
        record.apply_update(&update);
        record.touch(OffsetDateTime::now_utc());
        debug_assert!(record.id() == id);
        Ok(record)
    }

    async fn delete(&self, id: E::Id) -> Result<(), ServiceError> {
        tokio::time::sleep(self.latency.write).await;
        let snapshot = self.state.snapshot();
        if E::slice(&snapshot).store.contains(&id) {
            Ok(())
        } else {
            Err(ServiceError::not_found::<E>(&id))
        }
    }
}

pub struct SimulatedBackend {
    projects: SimulatedService<Project>,
    tasks: SimulatedService<Task>,
    team: SimulatedService<TeamMember>,
    users: SimulatedService<User>,
}

impl SimulatedBackend {
    pub fn new(state: StateReader, latency: LatencyProfile) -> Self {
        Self {
            projects: SimulatedService::new(state.clone(), latency),
            tasks: SimulatedService::new(state.clone(), latency),
            team: SimulatedService::new(state.clone(), latency).with_seed(demo_team()),
            users: SimulatedService::new(state, latency),
        }
    }
}

impl Backend for SimulatedBackend {
    type Projects = SimulatedService<Project>;
    type Tasks = SimulatedService<Task>;
    type Team = SimulatedService<TeamMember>;
    type Users = SimulatedService<User>;

    fn projects(&self) -> &Self::Projects {
        &self.projects
    }

    fn tasks(&self) -> &Self::Tasks {
        &self.tasks
    }

    fn team(&self) -> &Self::Team {
        &self.team
    }

    fn users(&self) -> &Self::Users {
        &self.users
    }
}

pub fn demo_team() -> Vec<TeamMember> {
    let member = |name: &str, email: &str, role, department: &str, joined_at| TeamMember {
        id: MemberId::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        avatar: None,
        department: Some(department.to_string()),
        projects_count: 0,
        tasks_count: 0,
        joined_at,
        status: MemberStatus::Active,
    };
    vec![
        member(
            "John Doe",
            "john.doe@projectflow.io",
            TeamRole::Admin,
            "Engineering",
            datetime!(2023-01-15 0:00 UTC),
        ),
        member(
            "Jane Smith",
            "jane.smith@projectflow.io",
            TeamRole::Manager,
            "Product",
            datetime!(2023-03-20 0:00 UTC),
        ),
        member(
            "Mike Johnson",
            "mike.johnson@projectflow.io",
            TeamRole::Developer,
            "Engineering",
            datetime!(2023-06-10 0:00 UTC),
        ),
        member(
            "Sarah Wilson",
            "sarah.wilson@projectflow.io",
            TeamRole::Designer,
            "Design",
            datetime!(2023-09-05 0:00 UTC),
        ),
    ]
}
