pub mod core;

pub use crate::core::{
    Action, AppState, EntityAction, LatencyProfile, Notification, ServiceError, Store, StoreConfig,
    StoreHandle, Subscription,
};
