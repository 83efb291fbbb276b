use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::models::{
    AuthUser, Event, EventDraft, Notification, NotificationDraft, Participation, ProfileDraft,
    Session, SignUpOutcome, Volunteer, VolunteerHistory,
};
use crate::services::store::{AuthGateway, DataStore, StoreError};

/// In-process store for local development and tests
///
/// Rows keep insertion order. Ids for events and notifications are
/// sequential, mirroring identity columns in the managed store.
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<Event>>,
    volunteers: Mutex<Vec<Volunteer>>,
    notifications: Mutex<Vec<Notification>>,
    history: Mutex<Vec<VolunteerHistory>>,
    participations: Mutex<Vec<Participation>>,
    accounts: Mutex<HashMap<String, Account>>,
    next_id: AtomicU64,
}

struct Account {
    user: AuthUser,
    password: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with rows, as if they were already persisted
    pub async fn seed(
        &self,
        events: Vec<Event>,
        volunteers: Vec<Volunteer>,
        history: Vec<VolunteerHistory>,
        participations: Vec<Participation>,
    ) {
        self.events.lock().await.extend(events);
        self.volunteers.lock().await.extend(volunteers);
        self.history.lock().await.extend(history);
        self.participations.lock().await.extend(participations);
    }

    fn next_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }

    fn session_for(user: &AuthUser) -> Session {
        Session {
            access_token: format!("memory-token-{}", user.id),
            refresh_token: None,
            expires_in: Some(3600),
            user: user.clone(),
        }
    }
}

fn apply_draft(event: &mut Event, draft: &EventDraft) {
    event.title = draft.title.clone();
    event.description = Some(draft.description.clone());
    event.location = draft.location.clone();
    event.required_skills = draft.required_skills.clone();
    event.urgency = Some(draft.urgency);
    event.date = draft.date.clone();
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.lock().await.clone())
    }

    async fn get_event(&self, id: &str) -> Result<Event, StoreError> {
        self.events
            .lock()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id)))
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let mut event = Event {
            id: self.next_id(),
            ..Default::default()
        };
        apply_draft(&mut event, draft);

        self.events.lock().await.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: &str, draft: &EventDraft) -> Result<Event, StoreError> {
        let mut events = self.events.lock().await;
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("event {}", id)))?;

        apply_draft(event, draft);
        Ok(event.clone())
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|e| e.id != id);

        if events.len() == before {
            return Err(StoreError::NotFound(format!("event {}", id)));
        }
        Ok(())
    }

    async fn list_volunteers(&self) -> Result<Vec<Volunteer>, StoreError> {
        Ok(self.volunteers.lock().await.clone())
    }

    async fn get_volunteer(&self, id: &str) -> Result<Volunteer, StoreError> {
        self.volunteers
            .lock()
            .await
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }

    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<Volunteer, StoreError> {
        let volunteer = Volunteer {
            id: draft.id.clone(),
            full_name: Some(draft.full_name.clone()),
            address: Some(draft.address.clone()),
            city: Some(draft.city.clone()),
            state: Some(draft.state.clone()),
            zip_code: Some(draft.zip_code.clone()),
            skills: draft.skills.clone(),
            preferences: draft.preferences.clone(),
            availability: draft.availability.clone(),
            role: Some(draft.role.clone()),
        };

        let mut volunteers = self.volunteers.lock().await;
        match volunteers.iter_mut().find(|v| v.id == draft.id) {
            Some(existing) => *existing = volunteer.clone(),
            None => volunteers.push(volunteer.clone()),
        }
        Ok(volunteer)
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        let mut notifications = self.notifications.lock().await.clone();
        // Newest first; `sent` is RFC 3339 so it sorts lexically
        notifications.reverse();
        notifications.sort_by(|a, b| b.sent.cmp(&a.sent));
        Ok(notifications)
    }

    async fn send_notification(&self, draft: &NotificationDraft) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: self.next_id(),
            kind: Some(draft.kind.clone()),
            event: draft.event.clone(),
            message: draft.message.clone(),
            status: Some(draft.status.clone().unwrap_or_else(|| "Pending".to_string())),
            sent: Some(chrono::Utc::now().to_rfc3339()),
        };

        self.notifications.lock().await.push(notification.clone());
        Ok(notification)
    }

    async fn delete_notification(&self, id: &str) -> Result<(), StoreError> {
        let mut notifications = self.notifications.lock().await;
        let before = notifications.len();
        notifications.retain(|n| n.id != id);

        if notifications.len() == before {
            return Err(StoreError::NotFound(format!("notification {}", id)));
        }
        Ok(())
    }

    async fn list_volunteer_history(&self) -> Result<Vec<VolunteerHistory>, StoreError> {
        Ok(self.history.lock().await.clone())
    }

    async fn list_participations(&self) -> Result<Vec<Participation>, StoreError> {
        Ok(self.participations.lock().await.clone())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[async_trait]
impl AuthGateway for MemoryStore {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let key = email.trim().to_lowercase();

        if accounts.contains_key(&key) {
            return Err(StoreError::Rejected("User already registered".to_string()));
        }

        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(key.clone()),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );

        Ok(SignUpOutcome {
            session: Some(Self::session_for(&user)),
            user,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let accounts = self.accounts.lock().await;
        match accounts.get(&email.trim().to_lowercase()) {
            Some(account) if account.password == password => Ok(Self::session_for(&account.user)),
            _ => Err(StoreError::Rejected("Invalid login credentials".to_string())),
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let user_id = access_token
            .strip_prefix("memory-token-")
            .ok_or_else(|| StoreError::Unauthorized("invalid token".to_string()))?;

        self.accounts
            .lock()
            .await
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| StoreError::Unauthorized("unknown user".to_string()))
    }
}
