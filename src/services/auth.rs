//! Ownership-based authorization
//!
//! There are no global roles: a caller is an organizer only for the events
//! they created, and an author only for the queries they wrote. Every check
//! runs before the write it guards.

use std::collections::HashSet;

use crate::models::{Event, Query, UserId};
use crate::utils::errors::{Result, VoloConnectError};
use crate::utils::logging::log_denied;

/// Relationship a caller holds to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Created the event
    Organizer,
    /// Wrote the query
    QueryAuthor,
}

/// Everything a caller may do with one event (and optionally one of its queries)
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub permissions: HashSet<Permission>,
}

impl AuthContext {
    pub fn for_event(user_id: UserId, event: &Event) -> Self {
        let mut permissions = HashSet::new();
        if event.is_organizer(user_id) {
            permissions.insert(Permission::Organizer);
        }
        Self { user_id, permissions }
    }

    pub fn for_query(user_id: UserId, event: &Event, query: &Query) -> Self {
        let mut context = Self::for_event(user_id, event);
        if query.author_id == user_id {
            context.permissions.insert(Permission::QueryAuthor);
        }
        context
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    /// Fail with `Authorization` unless one of `permissions` is held
    pub fn require_any(&self, permissions: &[Permission], operation: &str) -> Result<()> {
        if self.has_any_permission(permissions) {
            return Ok(());
        }

        let reason = match permissions {
            [Permission::Organizer] => "only the event organizer may do this",
            _ => "only the event organizer or the query author may do this",
        };
        log_denied(operation, self.user_id, reason);
        Err(VoloConnectError::Authorization(format!(
            "user {} may not {}: {}",
            self.user_id, operation, reason
        )))
    }
}

/// Shorthand for organizer-only operations
pub fn require_organizer(event: &Event, user_id: UserId, operation: &str) -> Result<()> {
    AuthContext::for_event(user_id, event).require_any(&[Permission::Organizer], operation)
}
