use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::models::{
    AuthUser, Event, EventDraft, Notification, NotificationDraft, Participation, ProfileDraft,
    Session, SignUpOutcome, Volunteer, VolunteerHistory,
};
use crate::services::store::{AuthGateway, DataStore, StoreError};

/// Supabase REST client
///
/// Handles all communication with the managed backend including:
/// - Table reads and writes through PostgREST (`/rest/v1`)
/// - Email/password authentication through GoTrue (`/auth/v1`)
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

/// Table names in the Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub events: String,
    pub profiles: String,
    pub notifications: String,
    pub volunteer_history: String,
    pub volunteer_events: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            events: "events".to_string(),
            profiles: "profile".to_string(),
            notifications: "notifications".to_string(),
            volunteer_history: "volunteer_history".to_string(),
            volunteer_events: "volunteer_events".to_string(),
        }
    }
}

impl SupabaseClient {
    /// Create a new Supabase client
    ///
    /// `api_key` is sent both as the `apikey` header and as the bearer token,
    /// so a service-role key bypasses row-level security.
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// PostgREST equality filter, e.g. `id=eq.42`
    fn eq_filter(column: &str, value: &str) -> String {
        format!("{}=eq.{}", column, urlencoding::encode(value))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Fetch every row of a table, optionally ordered (`column.desc`)
    async fn select_all<T>(&self, table: &str, order: Option<&str>) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let mut url = format!("{}?select=*", self.table_url(table));
        if let Some(order) = order {
            url.push_str("&order=");
            url.push_str(order);
        }

        tracing::debug!("Selecting rows from: {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, table).await?;
        parse_rows(response, table).await
    }

    /// Fetch the first row matching `column = value`
    async fn select_one<T>(&self, table: &str, column: &str, value: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!(
            "{}?select=*&{}&limit=1",
            self.table_url(table),
            Self::eq_filter(column, value)
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, table).await?;
        let rows: Vec<T> = parse_rows(response, table).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{} {} not found in {}", column, value, table)))
    }

    /// Insert (or upsert) a row and return the stored representation
    async fn insert<B, T>(&self, table: &str, body: &B, upsert: bool) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let prefer = if upsert {
            "resolution=merge-duplicates,return=representation"
        } else {
            "return=representation"
        };

        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;

        let response = check_status(response, table).await?;
        let rows: Vec<T> = parse_rows(response, table).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse(format!("Insert into {} returned no rows", table)))
    }

    async fn update<B, T>(&self, table: &str, id: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}?{}", self.table_url(table), Self::eq_filter("id", id));

        let response = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = check_status(response, table).await?;
        let rows: Vec<T> = parse_rows(response, table).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("id {} not found in {}", id, table)))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?{}", self.table_url(table), Self::eq_filter("id", id));

        let response = self
            .authorized(self.client.delete(&url))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let response = check_status(response, table).await?;
        let rows: Vec<Value> = parse_rows(response, table).await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("id {} not found in {}", id, table)));
        }

        tracing::debug!("Deleted {} from {}", id, table);
        Ok(())
    }

    async fn post_auth(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(self.auth_url(path))
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;

        let response = check_status(response, "auth").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        self.select_all(&self.tables.events, None).await
    }

    async fn get_event(&self, id: &str) -> Result<Event, StoreError> {
        self.select_one(&self.tables.events, "id", id).await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let event: Event = self.insert(&self.tables.events, draft, false).await?;
        tracing::info!("Created event {} ({})", event.id, event.title);
        Ok(event)
    }

    async fn update_event(&self, id: &str, draft: &EventDraft) -> Result<Event, StoreError> {
        self.update(&self.tables.events, id, draft).await
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&self.tables.events, id).await
    }

    async fn list_volunteers(&self) -> Result<Vec<Volunteer>, StoreError> {
        self.select_all(&self.tables.profiles, None).await
    }

    async fn get_volunteer(&self, id: &str) -> Result<Volunteer, StoreError> {
        self.select_one(&self.tables.profiles, "id", id).await
    }

    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<Volunteer, StoreError> {
        self.insert(&self.tables.profiles, draft, true).await
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, StoreError> {
        self.select_all(&self.tables.notifications, Some("sent.desc")).await
    }

    async fn send_notification(&self, draft: &NotificationDraft) -> Result<Notification, StoreError> {
        self.insert(&self.tables.notifications, draft, false).await
    }

    async fn delete_notification(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&self.tables.notifications, id).await
    }

    async fn list_volunteer_history(&self) -> Result<Vec<VolunteerHistory>, StoreError> {
        self.select_all(&self.tables.volunteer_history, None).await
    }

    async fn list_participations(&self) -> Result<Vec<Participation>, StoreError> {
        self.select_all(&self.tables.volunteer_events, None).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}?select=id&limit=1", self.table_url(&self.tables.events));
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, StoreError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let json = self.post_auth("signup", &body).await?;

        // With email confirmation enabled GoTrue answers with the bare user,
        // otherwise with a full session.
        if json.get("access_token").is_some() {
            let session: Session = serde_json::from_value(json)
                .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse session: {}", e)))?;
            Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: AuthUser = serde_json::from_value(json.get("user").cloned().unwrap_or(json))
                .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse user: {}", e)))?;
            Ok(SignUpOutcome { user, session: None })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let json = self.post_auth("token?grant_type=password", &body).await?;

        serde_json::from_value(json)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse session: {}", e)))
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let response = check_status(response, "auth").await?;
        let json: Value = response.json().await?;

        serde_json::from_value(json)
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse user: {}", e)))
    }
}

/// Map non-success statuses to store errors, keeping the backend's message
async fn check_status(response: Response, context: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    let message = error_message(&body).unwrap_or_else(|| status.to_string());

    tracing::warn!("Supabase request on {} failed: {} - {}", context, status, body);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        s if s.is_client_error() => StoreError::Rejected(message),
        _ => StoreError::Backend(message),
    })
}

/// PostgREST uses `message`, GoTrue uses `msg` or `error_description`
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

async fn parse_rows<T>(response: Response, table: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
{
    let json: Value = response.json().await?;

    let rows = json
        .as_array()
        .ok_or_else(|| StoreError::InvalidResponse(format!("Expected an array of {} rows", table)))?;

    rows.iter()
        .map(|row| {
            serde_json::from_value(row.clone()).map_err(|e| {
                StoreError::InvalidResponse(format!("Failed to parse {} row: {}", table, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Urgency};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> SupabaseClient {
        SupabaseClient::new(server.url(), "service_key".to_string(), SupabaseTables::default(), 5)
            .expect("client")
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Community Cleanup Drive".to_string(),
            description: "Bring gloves".to_string(),
            location: "Central Park".to_string(),
            required_skills: vec!["Manual Labor".to_string()],
            urgency: Urgency::Medium,
            date: "2024-02-14".to_string(),
        }
    }

    #[test]
    fn test_eq_filter_encodes_value() {
        assert_eq!(SupabaseClient::eq_filter("id", "42"), "id=eq.42");
        assert_eq!(SupabaseClient::eq_filter("id", "a b&c"), "id=eq.a%20b%26c");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"duplicate key"}"#).as_deref(), Some("duplicate key"));
        assert_eq!(error_message(r#"{"msg":"User already registered"}"#).as_deref(), Some("User already registered"));
        assert_eq!(error_message("not json"), None);
    }

    #[tokio::test]
    async fn test_list_events_sends_keys_and_parses_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("apikey", "service_key")
            .match_header("authorization", "Bearer service_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    { "id": 1, "title": "Food Bank", "location": "Downtown", "required_skills": ["Driving"], "date": "2024-02-13" },
                    { "id": 2, "title": "Cleanup", "location": "Park", "required_skills": "[\"Manual Labor\"]", "date": "2024-02-14" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let events = client_for(&server).list_events().await.unwrap();

        mock.assert_async().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[1].required_skills, vec!["Manual Labor"]);
    }

    #[tokio::test]
    async fn test_get_event_missing_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/events")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = client_for(&server).get_event("999").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_event_posts_draft() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/events")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJson(json!({
                "title": "Community Cleanup Drive",
                "required_skills": ["Manual Labor"],
                "urgency": "medium"
            })))
            .with_status(201)
            .with_body(
                json!([{ "id": 7, "title": "Community Cleanup Drive", "location": "Central Park", "date": "2024-02-14" }])
                    .to_string(),
            )
            .create_async()
            .await;

        let event = client_for(&server).create_event(&draft()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(event.id, "7");
    }

    #[tokio::test]
    async fn test_backend_rejection_keeps_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/events")
            .with_status(400)
            .with_body(r#"{"code":"22P02","message":"invalid input syntax for type date"}"#)
            .create_async()
            .await;

        let err = client_for(&server).create_event(&draft()).await.unwrap_err();
        match err {
            StoreError::Rejected(message) => assert_eq!(message, "invalid input syntax for type date"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_event_with_no_rows_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.5".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = client_for(&server).delete_event("5").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upsert_profile_merges_duplicates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/profile")
            .match_header("prefer", "resolution=merge-duplicates,return=representation")
            .match_body(Matcher::PartialJson(json!({
                "id": "u1",
                "city": "Houston",
                "availability": ["2024-03-20"]
            })))
            .with_status(201)
            .with_body(
                json!([{ "id": "u1", "full_name": "Jane", "city": "Houston", "skills": ["Teaching"], "availability": ["2024-03-20"] }])
                    .to_string(),
            )
            .create_async()
            .await;

        let draft = ProfileDraft {
            id: "u1".to_string(),
            full_name: "Jane".to_string(),
            address: "1 Main St".to_string(),
            city: "Houston".to_string(),
            state: "TX".to_string(),
            zip_code: "77004".to_string(),
            skills: vec!["Teaching".to_string()],
            preferences: None,
            availability: Availability::from_strings(["2024-03-20"]),
            role: "user".to_string(),
        };

        let volunteer = client_for(&server).upsert_profile(&draft).await.unwrap();

        mock.assert_async().await;
        assert_eq!(volunteer.id, "u1");
        assert_eq!(volunteer.city.as_deref(), Some("Houston"));
    }

    #[tokio::test]
    async fn test_update_event_patches_by_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.7".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJson(json!({ "title": "Community Cleanup Drive" })))
            .with_status(200)
            .with_body(json!([{ "id": 7, "title": "Community Cleanup Drive", "location": null }]).to_string())
            .create_async()
            .await;

        let event = client_for(&server).update_event("7", &draft()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(event.id, "7");
        assert_eq!(event.location, "");
    }

    #[tokio::test]
    async fn test_update_event_with_no_rows_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.404".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = client_for(&server).update_event("404", &draft()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_events_tolerates_null_columns() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/events")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!([
                    { "id": 1, "title": "Food Drive", "location": null, "date": null, "required_skills": null },
                    { "id": 2, "title": "Cleanup", "location": "Park", "date": "2024-02-14" }
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let events = client_for(&server).list_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].location, "");
        assert_eq!(events[1].location, "Park");
    }

    #[tokio::test]
    async fn test_notifications_ordered_newest_first() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/notifications")
            .match_query(Matcher::UrlEncoded("order".into(), "sent.desc".into()))
            .with_status(200)
            .with_body(json!([{ "id": 3, "type": "Reminder", "event": "Food Drive", "message": "Bring water" }]).to_string())
            .create_async()
            .await;

        let notifications = client_for(&server).list_notifications().await.unwrap();

        mock.assert_async().await;
        assert_eq!(notifications[0].kind.as_deref(), Some("Reminder"));
    }

    #[tokio::test]
    async fn test_sign_up_without_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/signup")
            .with_status(200)
            .with_body(json!({ "id": "u-1", "email": "jane@example.org", "confirmation_sent_at": "2024-02-01T00:00:00Z" }).to_string())
            .create_async()
            .await;

        let outcome = client_for(&server).sign_up("jane@example.org", "secret123").await.unwrap();

        assert_eq!(outcome.user.id, "u-1");
        assert!(outcome.session.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_bad_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
            .create_async()
            .await;

        let err = client_for(&server).sign_in("jane@example.org", "wrong").await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(ref m) if m == "Invalid login credentials"));
    }
}
