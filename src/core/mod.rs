pub mod action;
pub mod effects;
pub mod entity;
pub mod model;
pub mod propagation;
pub mod reducer;
pub mod resource;
pub mod runtime;
pub mod selectors;
pub mod service;
pub mod stats;

pub use action::{Action, EntityAction, Phase};
pub use entity::{Entity, EntityStore, StoreError};
pub use reducer::{AppState, EntityState};
pub use resource::{Filters, Resource, ResourceKind};
pub use runtime::{Notification, NotificationLevel, Store, StoreConfig, StoreHandle, Subscription};
pub use service::{
    Backend, LatencyProfile, Service, ServiceError, SimulatedBackend, SimulatedService, StateReader,
};
