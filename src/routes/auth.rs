use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::models::{CredentialsRequest, SessionResponse, SignUpResponse, UserResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/signup", web::post().to(sign_up))
        .route("/auth/signin", web::post().to(sign_in))
        .route("/auth/user", web::get().to(current_user));
}

async fn sign_up(
    state: web::Data<AppState>,
    req: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let outcome = state.auth.sign_up(&req.email, &req.password).await?;
    tracing::info!("Registered user {}", outcome.user.id);

    Ok(HttpResponse::Ok().json(SignUpResponse {
        message: "User created successfully!".to_string(),
        user_id: outcome.user.id,
        session: outcome.session,
    }))
}

async fn sign_in(
    state: web::Data<AppState>,
    req: web::Json<CredentialsRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let session = state
        .auth
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| match ApiError::from(e) {
            // Bad credentials come back as 400 from the provider
            ApiError::BadRequest(msg) => ApiError::Unauthorized(msg),
            other => other,
        })?;

    Ok(HttpResponse::Ok().json(SessionResponse { session }))
}

async fn current_user(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let token = bearer_token(&http_req)?;
    let user = state.auth.current_user(token).await?;

    Ok(HttpResponse::Ok().json(UserResponse { user }))
}
