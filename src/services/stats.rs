//! Statistics aggregator
//!
//! Read-only summaries recomputed from the event and signup stores on every
//! call. Nothing here is cached.

use chrono::Utc;
use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::Result;
use crate::utils::helpers::normalize_skills;

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    db: DatabaseService,
}

impl StatsAggregator {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn compute_stats(&self, scope: StatsScope) -> Result<EventStats> {
        let organizer_id = match scope {
            StatsScope::Global => None,
            StatsScope::Organizer(id) => Some(id),
        };

        let (events, signups) = futures::try_join!(
            self.db.events.list(None, organizer_id),
            self.db.signups.list_all()
        )?;

        let mut stats = EventStats {
            total_events: events.len() as u64,
            ..Default::default()
        };
        for event in &events {
            match event.effective_status() {
                EffectiveStatus::Active => stats.active_events += 1,
                EffectiveStatus::Full => stats.full_events += 1,
                EffectiveStatus::Completed => stats.completed_events += 1,
                EffectiveStatus::Cancelled => stats.cancelled_events += 1,
            }
        }

        let in_scope: HashSet<EventId> = events.iter().map(|e| e.id).collect();
        let approved: Vec<&VolunteerSignup> = signups
            .iter()
            .filter(|s| s.status == SignupStatus::Approved && in_scope.contains(&s.event_id))
            .collect();

        stats.total_volunteers = approved
            .iter()
            .map(|s| s.volunteer_id)
            .collect::<HashSet<_>>()
            .len() as u64;
        stats.total_hours = approved.iter().map(|s| s.hours_contributed).sum();

        debug!(scope = ?scope, total_events = stats.total_events, "Computed event statistics");
        Ok(stats)
    }

    /// Participation summary for one volunteer. Rejected signups do not count.
    pub async fn volunteer_stats(&self, volunteer_id: UserId) -> Result<VolunteerStats> {
        let signups = self.db.signups.list_for_volunteer(volunteer_id).await?;
        let events: HashMap<EventId, Event> = try_join_all(
            signups
                .iter()
                .map(|s| s.event_id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|id| self.db.events.find_by_id(id)),
        )
        .await?
        .into_iter()
        .flatten()
        .map(|e| (e.id, e))
        .collect();

        let now = Utc::now();
        let mut stats = VolunteerStats {
            volunteer_id,
            ..Default::default()
        };
        let mut roles: Vec<String> = Vec::new();
        let mut skills: Vec<&str> = Vec::new();

        for signup in signups.iter().filter(|s| s.status != SignupStatus::Rejected) {
            stats.total_events += 1;
            if !roles.contains(&signup.role) {
                roles.push(signup.role.clone());
            }
            skills.extend(signup.skills.iter().map(String::as_str));

            if signup.status != SignupStatus::Approved {
                continue;
            }
            stats.total_hours += signup.hours_contributed;
            if let Some(event) = events.get(&signup.event_id) {
                match event.status {
                    EventStatus::Completed => stats.completed_events += 1,
                    EventStatus::Active if !event.has_ended(now) => stats.upcoming_commitments += 1,
                    _ => {}
                }
            }
        }

        stats.roles = roles;
        stats.skills = normalize_skills(skills);
        Ok(stats)
    }
}
