//! Test data helpers for creating request objects

use chrono::{Duration, Utc};
use voloconnect::models::{CreateEventRequest, SignupDetails};

pub const ORGANIZER: i64 = 100;

/// A valid event starting next week
pub fn event_request(max_volunteers: i32) -> CreateEventRequest {
    let start_date = Utc::now() + Duration::days(7);
    CreateEventRequest {
        title: "Riverside cleanup".to_string(),
        description: "Collect litter along the riverbank and sort recyclables".to_string(),
        location: "Riverside park, east gate".to_string(),
        start_date,
        end_date: start_date + Duration::hours(3),
        max_volunteers,
        required_skills: vec!["Lifting".to_string()],
    }
}

pub fn signup_details(role: &str) -> SignupDetails {
    SignupDetails {
        role: Some(role.to_string()),
        skills: vec!["Lifting".to_string()],
        available_hours: Some("Saturday morning".to_string()),
        ..Default::default()
    }
}
