use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::data::session_registry::SessionRegistry;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::repository::UserRepository;
use crate::domain::user::User;

pub const SESSION_COOKIE: &str = "session_id";

/// Identity resolved for the current request. Present in request
/// extensions only when the session token resolved to a known user.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

// Session Auth Middleware: resolves the session cookie to a user
// before the handler runs. An absent or unknown token simply leaves
// the request anonymous; rejection is the extractor's job.
pub struct SessionAuthMiddleware {
    sessions: SessionRegistry,
    users: Arc<InMemoryUserRepository>,
}

impl SessionAuthMiddleware {
    pub fn new(sessions: SessionRegistry, users: Arc<InMemoryUserRepository>) -> Self {
        Self { sessions, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
            sessions: self.sessions.clone(),
            users: self.users.clone(),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
    sessions: SessionRegistry,
    users: Arc<InMemoryUserRepository>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let sessions = self.sessions.clone();
        let users = self.users.clone();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            if let Some(token) = token {
                match sessions.resolve(&token).await {
                    Some(email) => match users.find_by_email(&email).await {
                        Ok(Some(user)) => {
                            trace!(user_id = user.id, "Session resolved to user");
                            req.extensions_mut().insert(AuthenticatedUser { user });
                        }
                        Ok(None) => {
                            // Session survived a user we no longer know.
                            warn!(email = %email, "Session resolves to missing user");
                        }
                        Err(e) => {
                            warn!(error = %e, "User lookup failed during session resolution");
                        }
                    },
                    None => trace!("Unknown session token, request stays anonymous"),
                }
            }

            service.call(req).await
        })
    }
}

// Request ID Middleware
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let request_id = Uuid::new_v4().to_string();

        req.extensions_mut().insert(request_id.clone());

        let fut = service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut().insert(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
            );
            Ok(res)
        })
    }
}
