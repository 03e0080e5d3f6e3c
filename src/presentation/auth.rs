use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::handlers::{AppState, StoreError};
use crate::presentation::middleware::SESSION_COOKIE;
use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: u32,
    pub email: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub session_token: String,
}

#[derive(Serialize)]
pub struct CurrentUserResponse {
    pub email: Option<String>,
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, StoreError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register(req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Registration failed");
            StoreError::from(e)
        })?;

    let response = RegisterResponse {
        id: user.id,
        email: user.email,
    };
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, StoreError> {
    info!("Login request received");

    let token = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Login failed");
            StoreError::from(e)
        })?;

    let cookie = Cookie::build(SESSION_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(LoginResponse {
            session_token: token,
        }))
}

#[instrument(skip(state, req))]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, StoreError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        state.auth_service.logout(cookie.value()).await;
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.make_removal();

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(removal)
        .finish())
}

#[instrument(skip(state, req))]
pub async fn current_user(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, StoreError> {
    let token = req.cookie(SESSION_COOKIE);
    let user = state
        .auth_service
        .current_user(token.as_ref().map(|c| c.value()))
        .await
        .map_err(StoreError::from)?;

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        email: user.map(|u| u.email),
    }))
}
