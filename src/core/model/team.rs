use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::{
    action::{Action, EntityAction},
    entity::{Entity, EntityStore},
    model::matches_search,
    reducer::{AppState, EntityState},
    resource::{Filters, Resource, ResourceKind, merge_field},
};

uuid_id!(MemberId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Admin,
    Manager,
    Developer,
    Designer,
    Qa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    OnLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Derived on read; see `selectors::select_members_with_counts`.
    pub projects_count: usize,
    /// Derived on read; see `selectors::select_members_with_counts`.
    pub tasks_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    pub status: MemberStatus,
}

#[derive(Debug, Clone)]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    pub avatar: Option<String>,
    pub department: Option<String>,
    pub status: MemberStatus,
}

#[derive(Debug, Clone)]
pub struct TeamMemberUpdate {
    pub id: MemberId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<TeamRole>,
    pub avatar: Option<Option<String>>,
    pub department: Option<Option<String>>,
    pub status: Option<MemberStatus>,
}

impl TeamMemberUpdate {
    pub fn new(id: MemberId) -> Self {
        Self {
            id,
            name: None,
            email: None,
            role: None,
            avatar: None,
            department: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamFilters {
    pub role: Option<TeamRole>,
    pub status: Option<MemberStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamFiltersUpdate {
    pub role: Option<Option<TeamRole>>,
    pub status: Option<Option<MemberStatus>>,
    pub search: Option<Option<String>>,
}

impl Filters for TeamFilters {
    type Update = TeamFiltersUpdate;

    fn merge(&self, update: &TeamFiltersUpdate) -> Self {
        Self {
            role: merge_field(&self.role, &update.role),
            status: merge_field(&self.status, &update.status),
            search: merge_field(&self.search, &update.search),
        }
    }
}

impl TeamFilters {
    pub fn matches(&self, member: &TeamMember) -> bool {
        self.role.is_none_or(|role| member.role == role)
            && self.status.is_none_or(|status| member.status == status)
            && self.search.as_deref().is_none_or(|needle| {
                matches_search(
                    needle,
                    [member.name.as_str(), member.email.as_str()]
                        .into_iter()
                        .chain(member.department.as_deref()),
                )
            })
    }
}

impl Entity for TeamMember {
    type Id = MemberId;

    fn id(&self) -> &MemberId {
        &self.id
    }

    fn sort_cmp(a: &Self, b: &Self) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    }
}

impl Resource for TeamMember {
    const KIND: ResourceKind = ResourceKind::TeamMember;

    type New = NewTeamMember;
    type Update = TeamMemberUpdate;
    type Filters = TeamFilters;

    fn update_id(update: &TeamMemberUpdate) -> &MemberId {
        &update.id
    }

    fn apply_update(&mut self, update: &TeamMemberUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = avatar.clone();
        }
        if let Some(department) = &update.department {
            self.department = department.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    fn from_new(id: MemberId, new: NewTeamMember, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            role: new.role,
            avatar: new.avatar,
            department: new.department,
            projects_count: 0,
            tasks_count: 0,
            joined_at: now,
            status: new.status,
        }
    }

    // Members carry no modification timestamp.
    fn touch(&mut self, _now: OffsetDateTime) {}

    fn next_id(_existing: &EntityStore<Self>, _last_issued: Option<&MemberId>) -> MemberId {
        MemberId::new_v4()
    }

    fn lift(action: EntityAction<Self>) -> Action {
        Action::Team(action)
    }

    fn slice(state: &AppState) -> &EntityState<Self> {
        &state.team
    }
}
