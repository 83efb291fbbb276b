//! Volunteer Hub - backend for a volunteer management platform
//!
//! Events, volunteer profiles, notifications and reports behind a JSON API,
//! plus the matcher that shortlists volunteers for an event by shared skills,
//! location and availability.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, rank_volunteers, Matcher};
pub use models::{Availability, Event, MatchWeights, ScoredVolunteer, Urgency, Volunteer};
