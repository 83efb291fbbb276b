use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AuthUser, Event, EventDraft, Notification, NotificationDraft, Participation, ProfileDraft,
    Session, SignUpOutcome, Volunteer, VolunteerHistory,
};

/// Errors that can occur when talking to the data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Data access for events, volunteer profiles, notifications and history
///
/// Constructed once at startup and shared by every request handler.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    async fn get_event(&self, id: &str) -> Result<Event, StoreError>;

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError>;

    async fn update_event(&self, id: &str, draft: &EventDraft) -> Result<Event, StoreError>;

    async fn delete_event(&self, id: &str) -> Result<(), StoreError>;

    async fn list_volunteers(&self) -> Result<Vec<Volunteer>, StoreError>;

    async fn get_volunteer(&self, id: &str) -> Result<Volunteer, StoreError>;

    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<Volunteer, StoreError>;

    /// All notifications, newest first
    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError>;

    async fn send_notification(&self, draft: &NotificationDraft) -> Result<Notification, StoreError>;

    async fn delete_notification(&self, id: &str) -> Result<(), StoreError>;

    async fn list_volunteer_history(&self) -> Result<Vec<VolunteerHistory>, StoreError>;

    async fn list_participations(&self) -> Result<Vec<Participation>, StoreError>;

    /// Cheap reachability check for the health endpoint
    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Email/password authentication against the managed auth provider
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError>;

    async fn current_user(&self, access_token: &str) -> Result<AuthUser, StoreError>;
}
