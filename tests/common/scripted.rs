use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use projectflow::core::{
    Backend, EntityStore, Resource, Service, ServiceError,
    model::{Project, Task, TeamMember, User},
};
use time::OffsetDateTime;
use tokio::sync::Notify;

/// How long a scripted answer holds back.
enum Wait {
    For(Duration),
    Until(Arc<Notify>),
}

impl Wait {
    async fn wait(self) {
        match self {
            Wait::For(delay) => tokio::time::sleep(delay).await,
            Wait::Until(gate) => gate.notified().await,
        }
    }
}

/// A service whose answers are queued up front by the test.
///
/// Loads and updates pop the next scripted answer at call time; with nothing
/// queued loads return an empty list. Other writes fail with the next queued
/// error, or succeed with a fresh record for creates and `Rejected` for
/// updates.
pub struct ScriptedService<E: Resource> {
    loads: Mutex<VecDeque<(Wait, Result<Vec<E>, ServiceError>)>>,
    updates: Mutex<VecDeque<(Duration, Result<E, ServiceError>)>>,
    failures: Mutex<VecDeque<ServiceError>>,
}

impl<E: Resource> Default for ScriptedService<E> {
    fn default() -> Self {
        Self {
            loads: Mutex::new(VecDeque::new()),
            updates: Mutex::new(VecDeque::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }
}

impl<E: Resource> ScriptedService<E> {
    pub fn load_after(self, delay: Duration, result: Result<Vec<E>, ServiceError>) -> Self {
        self.loads.lock().unwrap().push_back((Wait::For(delay), result));
        self
    }

    /// The load answers once `gate` is notified.
    pub fn load_when(self, gate: Arc<Notify>, result: Result<Vec<E>, ServiceError>) -> Self {
        self.loads.lock().unwrap().push_back((Wait::Until(gate), result));
        self
    }

    pub fn update_after(self, delay: Duration, result: Result<E, ServiceError>) -> Self {
        self.updates.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn fail_next(self, err: ServiceError) -> Self {
        self.failures.lock().unwrap().push_back(err);
        self
    }

    fn next_failure(&self) -> Option<ServiceError> {
        self.failures.lock().unwrap().pop_front()
    }
}

impl<E: Resource> Service<E> for ScriptedService<E> {
    async fn get_all(&self) -> Result<Vec<E>, ServiceError> {
        let next = self.loads.lock().unwrap().pop_front();
        match next {
            Some((wait, result)) => {
                wait.wait().await;
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, new: E::New) -> Result<E, ServiceError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if let Some(err) = self.next_failure() {
            return Err(err);
        }
        let id = E::next_id(&EntityStore::new(), None);
        Ok(E::from_new(id, new, OffsetDateTime::now_utc()))
    }

    async fn update(&self, _update: E::Update) -> Result<E, ServiceError> {
        let scripted = self.updates.lock().unwrap().pop_front();
        if let Some((delay, result)) = scripted {
            tokio::time::sleep(delay).await;
            return result;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err(self
            .next_failure()
            .unwrap_or_else(|| ServiceError::Rejected("update not scripted".into())))
    }

    async fn delete(&self, _id: E::Id) -> Result<(), ServiceError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    pub projects: ScriptedService<Project>,
    pub tasks: ScriptedService<Task>,
    pub team: ScriptedService<TeamMember>,
    pub users: ScriptedService<User>,
}

impl Backend for ScriptedBackend {
    type Projects = ScriptedService<Project>;
    type Tasks = ScriptedService<Task>;
    type Team = ScriptedService<TeamMember>;
    type Users = ScriptedService<User>;

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
