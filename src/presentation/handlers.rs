use crate::application::auth_service::AuthService;
use crate::application::cart_service::CartService;
use crate::data::cart_repository::InMemoryCartRepository;
use crate::data::catalog::InMemoryCatalog;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::cart::CartItemRequest;
use crate::domain::catalog::Product;
use crate::domain::error::DomainError;
use crate::domain::repository::CatalogProvider;
use crate::domain::validation::ValidationErrors;
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const CATALOG_PAGE_SIZE: u32 = 6;

// AppState holding the services and shared state
pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub cart_service: Arc<CartService<InMemoryCartRepository, InMemoryCatalog>>,
    pub catalog: Arc<InMemoryCatalog>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

// Storefront API Error Types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error("A user with this email is already registered")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not found: {0}")]
    NotFound(String),
    // Not a failure: the caller just has no session yet. Rendered as
    // a redirect to the login page, unlike the 401 credential error.
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for StoreError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            StoreError::Validation(_) => actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::DuplicateEmail => actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::InvalidCredentials => actix_web::http::StatusCode::UNAUTHORIZED,
            StoreError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            StoreError::Unauthenticated => actix_web::http::StatusCode::SEE_OTHER,
            StoreError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let StoreError::Unauthenticated = self {
            info!("Anonymous request to an authenticated endpoint, redirecting to login");
            return HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish();
        }

        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            StoreError::Validation(errors) => {
                serde_json::to_value(&errors.fields).unwrap_or_default()
            }
            StoreError::DuplicateEmail => serde_json::json!({ "email": [error_msg.clone()] }),
            StoreError::InvalidCredentials => serde_json::json!({ "message": error_msg.clone() }),
            StoreError::NotFound(msg) => serde_json::json!({ "message": msg }),
            StoreError::Unauthenticated => serde_json::Value::Null,
            StoreError::Internal(_) => serde_json::json!({ "message": "Internal server error" }),
        };

        match self {
            StoreError::Validation(_) | StoreError::DuplicateEmail => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            StoreError::InvalidCredentials => {
                warn!(status = %status, "Invalid credentials")
            }
            StoreError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            StoreError::Unauthenticated => {}
            StoreError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(DomainError::Validation(errors)) => StoreError::Validation(errors),
            Ok(DomainError::DuplicateEmail) => StoreError::DuplicateEmail,
            Ok(DomainError::InvalidCredentials) => StoreError::InvalidCredentials,
            Ok(DomainError::ProductNotFound) => StoreError::NotFound("Product not found".to_string()),
            Ok(DomainError::Internal(msg)) => StoreError::Internal(msg),
            Err(other) => StoreError::Internal(other.to_string()),
        }
    }
}

// AuthenticatedUser extractor: anonymous requests get the
// redirect-class Unauthenticated outcome.
impl FromRequest for AuthenticatedUser {
    type Error = StoreError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move { user.ok_or(StoreError::Unauthenticated) })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, auth), fields(user_id = auth.user.id))]
pub async fn view_cart(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, StoreError> {
    let view = state.cart_service.view(auth.user.id).await.map_err(|e| {
        error!(error = %e, "Failed to build cart view");
        StoreError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(state, auth), fields(user_id = auth.user.id, product_id = req.product_id))]
pub async fn cart_add(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<CartItemRequest>,
) -> Result<HttpResponse, StoreError> {
    let product_id = req.product_id;
    info!(product_id, "Adding product to cart");
    state
        .cart_service
        .add(auth.user.id, product_id)
        .await
        .map_err(|e| {
            warn!(product_id, error = %e, "Failed to add product to cart");
            StoreError::from(e)
        })?;
    let view = state
        .cart_service
        .view(auth.user.id)
        .await
        .map_err(StoreError::from)?;
    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(state, auth), fields(user_id = auth.user.id, product_id = req.product_id))]
pub async fn cart_remove(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    req: web::Json<CartItemRequest>,
) -> Result<HttpResponse, StoreError> {
    let product_id = req.product_id;
    info!(product_id, "Removing product from cart");
    state
        .cart_service
        .remove(auth.user.id, product_id)
        .await
        .map_err(StoreError::from)?;
    let view = state
        .cart_service
        .view(auth.user.id)
        .await
        .map_err(StoreError::from)?;
    Ok(HttpResponse::Ok().json(view))
}

#[instrument(skip(state, auth), fields(user_id = auth.user.id))]
pub async fn cart_checkout(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, StoreError> {
    info!("Checkout confirmed, clearing cart");
    state
        .cart_service
        .clear(auth.user.id)
        .await
        .map_err(StoreError::from)?;
    let view = state
        .cart_service
        .view(auth.user.id)
        .await
        .map_err(StoreError::from)?;
    Ok(HttpResponse::Ok().json(view))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Serialize)]
struct CatalogPageResponse {
    category: String,
    page: u32,
    total_pages: u32,
    items: Vec<Product>,
}

#[instrument(skip(state), fields(category = %path))]
pub async fn catalog_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, StoreError> {
    let category = path.into_inner();
    let page = query.page.unwrap_or(1).max(1);
    // Widen before multiplying: page is attacker-controlled and
    // (page - 1) * PAGE_SIZE overflows u32 for large pages.
    let offset = u64::from(page - 1) * u64::from(CATALOG_PAGE_SIZE);

    let total = state
        .catalog
        .count_products_in_category(&category)
        .await
        .map_err(StoreError::from)?;
    let total_pages = total.div_ceil(u64::from(CATALOG_PAGE_SIZE)) as u32;

    let items = state
        .catalog
        .get_products_by_category_paginated(&category, CATALOG_PAGE_SIZE, offset)
        .await
        .map_err(StoreError::from)?;

    info!(category = %category, page, total_pages, "Catalog page served");
    Ok(HttpResponse::Ok().json(CatalogPageResponse {
        category,
        page,
        total_pages,
        items,
    }))
}

#[instrument(skip(state), fields(product_id = %*path))]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<u32>,
) -> Result<HttpResponse, StoreError> {
    let product_id = path.into_inner();
    let product = state
        .catalog
        .get_product(product_id)
        .await
        .map_err(StoreError::from)?
        .ok_or_else(|| StoreError::NotFound("Product not found".to_string()))?;
    Ok(HttpResponse::Ok().json(product))
}
