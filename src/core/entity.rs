use std::{cmp::Ordering, fmt, hash::Hash};

/// A record that can live in an [`EntityStore`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Display order used by [`EntityStore::all`].
    fn sort_cmp(a: &Self, b: &Self) -> Ordering;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {id} not found")]
    NotFound { id: String },
}

/// Normalized collection keyed by id. Operations return a new collection.
#[derive(Clone)]
pub struct EntityStore<E: Entity> {
    entities: im::HashMap<E::Id, E>,
    ids: im::Vector<E::Id>,
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        Self {
            entities: im::HashMap::new(),
            ids: im::Vector::new(),
        }
    }
}

impl<E: Entity + fmt::Debug> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.all()).finish()
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = E>) -> Self {
        Self::new().set_all(records)
    }

    pub fn set_all(&self, records: impl IntoIterator<Item = E>) -> Self {
        let mut entities = im::HashMap::new();
        for record in records {
            entities.insert(record.id().clone(), record);
        }
        Self::sorted(entities)
    }

    /// Insert a record. A record whose id is already present is ignored.
    pub fn add_one(&self, record: E) -> Self {
        if self.entities.contains_key(record.id()) {
            return self.clone();
        }
        let mut next = self.clone();
        let pos = next.insert_position(&record);
        next.ids.insert(pos, record.id().clone());
        next.entities.insert(record.id().clone(), record);
        next
    }

    /// `changes` must not alter the record's id.
    pub fn update_one(
        &self,
        id: &E::Id,
        changes: impl FnOnce(&mut E),
    ) -> Result<Self, StoreError> {
        let Some(current) = self.entities.get(id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        let mut record = current.clone();
        changes(&mut record);
        debug_assert!(record.id() == id, "update_one changed the entity id");

        let mut next = self.clone();
        next.ids.retain(|existing| existing != id);
        let pos = next.insert_position(&record);
        next.ids.insert(pos, id.clone());
        next.entities.insert(id.clone(), record);
        Ok(next)
    }

    /// Remove a record. Removing an absent id is a no-op.
    pub fn remove_one(&self, id: &E::Id) -> Self {
        if !self.entities.contains_key(id) {
            return self.clone();
        }
        let mut next = self.clone();
        next.entities.remove(id);
        next.ids.retain(|existing| existing != id);
        next
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.entities.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &E> + '_ {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn entities(&self) -> &im::HashMap<E::Id, E> {
        &self.entities
    }

    pub fn ids(&self) -> &im::Vector<E::Id> {
        &self.ids
    }

    pub fn total(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.entities.ptr_eq(&other.entities)
    }

    fn sorted(entities: im::HashMap<E::Id, E>) -> Self {
        let mut records: Vec<&E> = entities.values().collect();
        records.sort_by(|a, b| Self::order(a, b));
        let ids = records.into_iter().map(|r| r.id().clone()).collect();
        Self { entities, ids }
    }

    fn order(a: &E, b: &E) -> Ordering {
        E::sort_cmp(a, b).then_with(|| a.id().cmp(b.id()))
    }

    fn insert_position(&self, record: &E) -> usize {
        self.ids
            .iter()
            .position(|id| {
                self.entities
                    .get(id)
                    .is_some_and(|existing| Self::order(record, existing) == Ordering::Less)
            })
            .unwrap_or(self.ids.len())
    }
}
