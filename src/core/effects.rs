use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use crate::core::{
    action::{Action, EntityAction},
    propagation,
    reducer::AppState,
    resource::{Resource, ResourceKind},
    runtime::{Dispatcher, Origin, PendingGuard},
    service::{Backend, Service},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct WriteKey {
    kind: ResourceKind,
    id: String,
}

impl WriteKey {
    fn of<E: Resource>(id: &E::Id) -> Self {
        Self {
            kind: E::KIND,
            id: id.to_string(),
        }
    }
}

enum Write<E: Resource> {
    Update(E::Update),
    Delete(E::Id),
}

impl<E: Resource> Write<E> {
    fn id(&self) -> &E::Id {
        match self {
            Write::Update(update) => E::update_id(update),
            Write::Delete(id) => id,
        }
    }
}

type StartWrite<B> = Box<dyn FnOnce(&mut Effects<B>) + Send>;

struct QueuedWrite<B: Backend> {
    start: StartWrite<B>,
    _pending: PendingGuard,
}

pub(crate) struct Effects<B: Backend> {
    backend: Arc<B>,
    dispatcher: Dispatcher,
    /// Token of the newest load per kind. Older tokens are cancelled.
    loads: HashMap<ResourceKind, CancellationToken>,
    /// Writes to the same record run one at a time, in dispatch order.
    writes: HashMap<WriteKey, VecDeque<QueuedWrite<B>>>,
}

impl<B: Backend> Effects<B> {
    pub(crate) fn new(backend: B, dispatcher: Dispatcher) -> Self {
        Self {
            backend: Arc::new(backend),
            dispatcher,
            loads: HashMap::new(),
            writes: HashMap::new(),
        }
    }

    pub(crate) fn handle(&mut self, action: &Action, prev: &AppState, next: &AppState) {
        match action {
            Action::Projects(action) => self.entity(B::projects, action),
            Action::Tasks(EntityAction::Create(new)) => {
                let new = propagation::resolve_task_references(new.clone(), next);
                self.create(B::tasks, new);
            }
            Action::Tasks(EntityAction::Update(update)) => {
                let update = propagation::resolve_task_update_references(update.clone(), next);
                self.write(B::tasks, Write::Update(update));
            }
            Action::Tasks(action) => self.entity(B::tasks, action),
            Action::Team(action) => self.entity(B::team, action),
            Action::Users(action) => self.entity(B::users, action),
        }

        for update in propagation::plan(action, prev, next, OffsetDateTime::now_utc()) {
            self.dispatcher
                .send(Action::Projects(EntityAction::Update(update)), Origin::Effect);
        }
    }

    fn entity<E, S>(&mut self, service: fn(&B) -> &S, action: &EntityAction<E>)
    where
        E: Resource,
        S: Service<E>,
    {
        match action {
            EntityAction::Load => self.load(service),
            EntityAction::Create(new) => self.create(service, new.clone()),
            EntityAction::Update(update) => self.write(service, Write::Update(update.clone())),
            EntityAction::Delete(id) => self.write(service, Write::Delete(id.clone())),
            _ => {}
        }
    }

    /// Switch-to-latest: a newer load of the same kind supersedes this one.
    fn load<E, S>(&mut self, service: fn(&B) -> &S)
    where
        E: Resource,
        S: Service<E>,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.loads.insert(E::KIND, token.clone()) {
            previous.cancel();
            tracing::debug!(kind = %E::KIND, "superseded in-flight load");
        }

        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let pending = dispatcher.guard();
        tokio::spawn(async move {
            let _pending = pending;
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                result = service(&backend).get_all() => result,
            };
            let action = match result {
                Ok(records) => EntityAction::LoadSuccess(records),
                Err(err) => EntityAction::LoadFailure(err),
            };
            dispatcher.send(E::lift(action), Origin::Load(token));
        });
    }

    fn create<E, S>(&mut self, service: fn(&B) -> &S, new: E::New)
    where
        E: Resource,
        S: Service<E>,
    {
        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let pending = dispatcher.guard();
        tokio::spawn(async move {
            let _pending = pending;
            let action = match service(&backend).create(new).await {
                Ok(record) => EntityAction::CreateSuccess(record),
                Err(err) => EntityAction::CreateFailure(err),
            };
            dispatcher.send(E::lift(action), Origin::Effect);
        });
    }

    fn write<E, S>(&mut self, service: fn(&B) -> &S, write: Write<E>)
    where
        E: Resource,
        S: Service<E>,
    {
        let key = WriteKey::of::<E>(write.id());
        if let Some(queue) = self.writes.get_mut(&key) {
            tracing::debug!(
                kind = %key.kind,
                id = %key.id,
                queued = queue.len() + 1,
                "write queued behind in-flight request"
            );
            let start_key = key.clone();
            queue.push_back(QueuedWrite {
                start: Box::new(move |effects: &mut Effects<B>| {
                    effects.spawn_write(service, write, start_key)
                }),
                _pending: self.dispatcher.guard(),
            });
            return;
        }
        self.writes.insert(key.clone(), VecDeque::new());
        self.spawn_write(service, write, key);
    }

    fn spawn_write<E, S>(&mut self, service: fn(&B) -> &S, write: Write<E>, key: WriteKey)
    where
        E: Resource,
        S: Service<E>,
    {
        let backend = Arc::clone(&self.backend);
        let dispatcher = self.dispatcher.clone();
        let pending = dispatcher.guard();
        tokio::spawn(async move {
            let _pending = pending;
            let service = service(&backend);
            let action = match write {
                Write::Update(update) => match service.update(update).await {
                    Ok(record) => EntityAction::UpdateSuccess(record),
                    Err(err) => EntityAction::UpdateFailure(err),
                },
                Write::Delete(id) => match service.delete(id.clone()).await {
                    Ok(()) => EntityAction::DeleteSuccess(id),
                    Err(err) => EntityAction::DeleteFailure(err),
                },
            };
            dispatcher.send(E::lift(action), Origin::Write(key));
        });
    }

    /// Starts the next queued write for the same record, if any.
    pub(crate) fn release(&mut self, key: &WriteKey) {
        let next = self.writes.get_mut(key).and_then(VecDeque::pop_front);
        match next {
            Some(QueuedWrite { start, _pending }) => start(self),
            None => {
                self.writes.remove(key);
            }
        }
    }
}
