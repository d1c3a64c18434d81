use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::{
    action::{Action, EntityAction},
    entity::{Entity, EntityStore},
    model::matches_search,
    reducer::{AppState, EntityState},
    resource::{Filters, Resource, ResourceKind, merge_field},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
    Moderator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl UserUpdate {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: None,
            email: None,
            role: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilters {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFiltersUpdate {
    pub role: Option<Option<UserRole>>,
    pub search: Option<Option<String>>,
}

impl Filters for UserFilters {
    type Update = UserFiltersUpdate;

    fn merge(&self, update: &UserFiltersUpdate) -> Self {
        Self {
            role: merge_field(&self.role, &update.role),
            search: merge_field(&self.search, &update.search),
        }
    }
}

impl UserFilters {
    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|role| user.role == role)
            && self
                .search
                .as_deref()
                .is_none_or(|needle| matches_search(needle, [user.name.as_str(), user.email.as_str()]))
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn sort_cmp(a: &Self, b: &Self) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    type New = NewUser;
    type Update = UserUpdate;
    type Filters = UserFilters;

    fn update_id(update: &UserUpdate) -> &UserId {
        &update.id
    }

    fn apply_update(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(role) = update.role {
            self.role = role;
        }
    }

    fn from_new(id: UserId, new: NewUser, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            role: new.role,
            created_at: now,
            updated_at: None,
        }
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = Some(now);
    }

    /// Numeric ids continue from the highest one in use or already issued.
    fn next_id(existing: &EntityStore<Self>, last_issued: Option<&UserId>) -> UserId {
        let max = existing
            .ids()
            .iter()
            .chain(last_issued)
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        UserId(max + 1)
    }

    fn lift(action: EntityAction<Self>) -> Action {
        Action::Users(action)
    }

    fn slice(state: &AppState) -> &EntityState<Self> {
        &state.users
    }
}
