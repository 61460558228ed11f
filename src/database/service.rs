//! Database service layer
//!
//! Bundles the three repositories behind trait objects so the services can
//! run against PostgreSQL or the in-process store alike.

use std::sync::Arc;

use super::connection::DatabasePool;
use super::memory::MemoryStore;
use super::repositories::{
    EventRepository, PgEventRepository, PgQueryRepository, PgSignupRepository, QueryRepository,
    SignupRepository,
};
use crate::models::CapacityPolicy;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: Arc<dyn EventRepository>,
    pub signups: Arc<dyn SignupRepository>,
    pub queries: Arc<dyn QueryRepository>,
    policy: CapacityPolicy,
}

impl DatabaseService {
    pub fn postgres(pool: DatabasePool, policy: CapacityPolicy) -> Self {
        Self {
            events: Arc::new(PgEventRepository::new(pool.clone(), policy)),
            signups: Arc::new(PgSignupRepository::new(pool.clone(), policy)),
            queries: Arc::new(PgQueryRepository::new(pool)),
            policy,
        }
    }

    pub fn in_memory(policy: CapacityPolicy) -> Self {
        let store = MemoryStore::new(policy);
        Self {
            events: Arc::new(store.clone()),
            signups: Arc::new(store.clone()),
            queries: Arc::new(store),
            policy,
        }
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
