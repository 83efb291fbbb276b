use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::models::{ProfileRequest, VolunteerResponse, VolunteersResponse};
use crate::routes::AppState;
use crate::services::CacheKey;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/volunteers", web::get().to(list_volunteers))
        .route("/volunteers/{id}", web::get().to(get_volunteer))
        .route("/profile", web::put().to(upsert_profile));
}

async fn list_volunteers(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let volunteers = state.store.list_volunteers().await?;
    Ok(HttpResponse::Ok().json(VolunteersResponse { volunteers }))
}

async fn get_volunteer(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let volunteer = state
        .store
        .get_volunteer(&path)
        .await
        .map_err(|e| ApiError::from_store(e, "Profile not found"))?;

    Ok(HttpResponse::Ok().json(VolunteerResponse { volunteer }))
}

/// Create or replace a volunteer profile
///
/// The profile id is the token subject when the caller is authenticated,
/// otherwise the `id` from the body.
async fn upsert_profile(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<ProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let id = caller
        .subject
        .or_else(|| req.id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Profile id is required".into()))?;

    let volunteer = state.store.upsert_profile(&req.into_draft(id)).await?;
    tracing::info!("Saved profile {}", volunteer.id);

    // Any event's shortlist may include this volunteer
    if let Err(e) = state.cache.invalidate_prefix(CacheKey::MATCHES_PREFIX).await {
        tracing::warn!("Failed to invalidate cached matches: {}", e);
    }

    Ok(HttpResponse::Ok().json(VolunteerResponse { volunteer }))
}
