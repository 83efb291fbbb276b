use serde::{Deserialize, Serialize};

use crate::models::domain::{AuthUser, Event, Notification, ScoredVolunteer, Session, Volunteer};
use crate::services::CacheStats;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub event: Event,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Ranked volunteer shortlist for one event
#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub matches: Vec<ScoredVolunteer>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteersResponse {
    pub volunteers: Vec<Volunteer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerResponse {
    pub volunteer: Volunteer,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session: Session,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: AuthUser,
}

/// Dashboard metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total_events: usize,
    pub active_volunteers: usize,
    pub hours_donated: usize,
    pub engagement_rate: u32,
}

/// One row of the volunteer participation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerReportRow {
    pub name: String,
    pub events_participated: usize,
    pub total_points: i64,
}

/// One facility/date group of the events report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReportRow {
    pub event: String,
    pub date: String,
    pub volunteers: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerReportResponse {
    pub report: Vec<VolunteerReportRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventReportResponse {
    pub events: Vec<EventReportRow>,
}
