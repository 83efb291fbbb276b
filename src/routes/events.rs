use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::models::{EventRequest, EventResponse, EventsResponse, MatchesResponse, MessageResponse};
use crate::routes::AppState;
use crate::services::CacheKey;

const EVENT_NOT_FOUND: &str = "Event not found";

/// Configure all event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(list_events))
        .route("/events", web::post().to(create_event))
        .route("/events/{id}", web::get().to(get_event))
        .route("/events/{id}", web::put().to(update_event))
        .route("/events/{id}", web::delete().to(delete_event))
        .route("/events/{id}/matches", web::get().to(event_matches));
}

async fn list_events(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let events = state.store.list_events().await?;
    Ok(HttpResponse::Ok().json(EventsResponse { events }))
}

async fn create_event(
    state: web::Data<AppState>,
    _caller: Caller,
    req: web::Json<EventRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let event = state.store.create_event(&req.into_inner().into_draft()).await?;
    tracing::info!("Created event {} ({})", event.id, event.title);

    Ok(HttpResponse::Created().json(EventResponse { event }))
}

async fn get_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let event = state
        .store
        .get_event(&path)
        .await
        .map_err(|e| ApiError::from_store(e, EVENT_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(EventResponse { event }))
}

async fn update_event(
    state: web::Data<AppState>,
    _caller: Caller,
    path: web::Path<String>,
    req: web::Json<EventRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let id = path.into_inner();

    let event = state
        .store
        .update_event(&id, &req.into_inner().into_draft())
        .await
        .map_err(|e| ApiError::from_store(e, EVENT_NOT_FOUND))?;

    forget_matches(&state, &id).await;
    Ok(HttpResponse::Ok().json(EventResponse { event }))
}

async fn delete_event(
    state: web::Data<AppState>,
    _caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    state
        .store
        .delete_event(&id)
        .await
        .map_err(|e| ApiError::from_store(e, EVENT_NOT_FOUND))?;

    forget_matches(&state, &id).await;
    tracing::info!("Deleted event {}", id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// Ranked volunteer shortlist for an event
///
/// GET /api/events/{id}/matches
async fn event_matches(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cache_key = CacheKey::matches(&id);

    if let Ok(cached) = state.cache.get::<serde_json::Value>(&cache_key).await {
        tracing::debug!("Serving cached matches for event {}", id);
        return Ok(HttpResponse::Ok().json(cached));
    }

    // Read before the store so a concurrent write discards this shortlist
    let generation = state.cache.generation();

    let event = state
        .store
        .get_event(&id)
        .await
        .map_err(|e| ApiError::from_store(e, EVENT_NOT_FOUND))?;
    let volunteers = state.store.list_volunteers().await?;

    let matches = state.matcher.rank_volunteers(&event, &volunteers);

    tracing::info!(
        "Matched {} of {} volunteers for event {}",
        matches.len(),
        volunteers.len(),
        id
    );

    let response = MatchesResponse {
        event_id: event.id,
        matches,
        total_candidates: volunteers.len(),
    };

    if let Err(e) = state.cache.set_if_current(&cache_key, &response, generation).await {
        tracing::warn!("Failed to cache matches for event {}: {}", id, e);
    }

    Ok(HttpResponse::Ok().json(response))
}

async fn forget_matches(state: &AppState, event_id: &str) {
    if let Err(e) = state.cache.delete(&CacheKey::matches(event_id)).await {
        tracing::warn!("Failed to invalidate matches for event {}: {}", event_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Event, Urgency, Volunteer};
    use crate::routes::test_support::state_with;
    use crate::services::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn event_body() -> Value {
        json!({
            "title": "Food Drive",
            "description": "Sort donations",
            "location": "Houston",
            "requiredSkills": ["Cooking", "Driving"],
            "urgency": "high",
            "date": "2024-03-20"
        })
    }

    fn volunteer(id: &str, name: &str, city: &str, skills: &[&str], dates: &[&str]) -> Volunteer {
        Volunteer {
            id: id.to_string(),
            full_name: Some(name.to_string()),
            city: Some(city.to_string()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            availability: Availability::from_strings(dates.iter().copied()),
            ..Default::default()
        }
    }

    macro_rules! app {
        ($store:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state_with($store)))
                    .service(web::scope("/api").configure(configure)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_event_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let app = app!(store.clone());

        let req = test::TestRequest::post().uri("/api/events").set_json(event_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["event"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["event"]["urgency"], "high");

        let mut body = event_body();
        body["title"] = json!("Food Drive (moved)");
        let req = test::TestRequest::put()
            .uri(&format!("/api/events/{}", id))
            .set_json(body)
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["event"]["title"], "Food Drive (moved)");

        let req = test::TestRequest::delete().uri(&format!("/api/events/{}", id)).to_request();
        let deleted: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted["message"], "Event deleted successfully");

        let req = test::TestRequest::get().uri(&format!("/api/events/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Event not found");
    }

    #[actix_web::test]
    async fn test_create_event_rejects_invalid_body() {
        let app = app!(Arc::new(MemoryStore::new()));

        let mut body = event_body();
        body["requiredSkills"] = json!([]);
        let req = test::TestRequest::post().uri("/api/events").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["error"], "validation_failed");
        assert_eq!(json["status_code"], 400);
    }

    #[actix_web::test]
    async fn test_matches_ranked_and_cached() {
        let store = Arc::new(MemoryStore::new());
        let event = Event {
            id: "e1".to_string(),
            title: "Food Drive".to_string(),
            location: "Houston".to_string(),
            required_skills: vec!["Cooking".to_string(), "Driving".to_string()],
            urgency: Some(Urgency::High),
            date: "2024-03-20T10:00:00Z".to_string(),
            ..Default::default()
        };
        store
            .seed(
                vec![event],
                vec![
                    volunteer("v1", "Ana", "Houston", &["Cooking", "Driving"], &["2024-03-20"]),
                    volunteer("v2", "Ben", "Austin", &["Teaching"], &["2024-04-01"]),
                    volunteer("v3", "Cy", "Dallas", &["Cooking"], &[]),
                ],
                vec![],
                vec![],
            )
            .await;
        let app = app!(store.clone());

        let req = test::TestRequest::get().uri("/api/events/e1/matches").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["eventId"], "e1");
        assert_eq!(body["totalCandidates"], 3);
        let matches = body["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["id"], "v1");
        assert_eq!(matches[0]["matchScore"], 10);
        assert_eq!(matches[1]["id"], "v3");
        assert_eq!(matches[1]["matchScore"], 2);

        // Second call is served from cache even though the store changed
        store
            .seed(vec![], vec![volunteer("v4", "Di", "Houston", &[], &[])], vec![], vec![])
            .await;
        let req = test::TestRequest::get().uri("/api/events/e1/matches").to_request();
        let cached: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cached["totalCandidates"], 3);
    }

    #[actix_web::test]
    async fn test_matches_for_unknown_event() {
        let app = app!(Arc::new(MemoryStore::new()));

        let req = test::TestRequest::get().uri("/api/events/missing/matches").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
