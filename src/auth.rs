//! Bearer-token guard for write endpoints.

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::{ready, Ready};

use crate::error::ApiError;
use crate::routes::AppState;

/// Token verification settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub audience: String,
}

impl AuthConfig {
    pub fn disabled() -> Self {
        Self {
            jwt_secret: None,
            audience: "authenticated".to_string(),
        }
    }
}

/// Caller of a guarded endpoint
///
/// `subject` is `None` when no secret is configured and the request was
/// admitted anonymously.
#[derive(Debug, Clone)]
pub struct Caller {
    pub subject: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    #[allow(dead_code)]
    exp: Option<usize>,
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => authorize(req, &state.auth_config),
            None => Err(ApiError::Internal("application state missing".into())),
        };
        ready(result)
    }
}

/// Raw bearer token from the `Authorization` header
pub fn bearer_token(req: &HttpRequest) -> Result<&str, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))
}

fn authorize(req: &HttpRequest, config: &AuthConfig) -> Result<Caller, ApiError> {
    let Some(secret) = config.jwt_secret.as_deref() else {
        return Ok(Caller {
            subject: None,
            email: None,
        });
    };

    let token = bearer_token(req)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    Ok(Caller {
        subject: Some(data.claims.sub),
        email: data.claims.email,
    })
}
