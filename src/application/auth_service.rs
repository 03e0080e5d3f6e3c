use crate::data::session_registry::SessionRegistry;
use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, NewUser, RegisterRequest, User};
use crate::domain::validation::validate_registration;
use crate::infrastructure::security::{hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    sessions: SessionRegistry,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, sessions: SessionRegistry) -> Self {
        Self {
            user_repository,
            sessions,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        trace!("Starting user registration");

        if let Err(errors) = validate_registration(&req) {
            warn!(errors = %errors, "Registration input rejected");
            return Err(DomainError::Validation(errors).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        // The repository owns the uniqueness check; duplicates surface
        // as DomainError::DuplicateEmail from the atomic insert.
        let user = self
            .user_repository
            .insert(NewUser {
                name: req.name,
                surname: req.surname,
                email: req.email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, email = %user.email, "User registered successfully");
        Ok(user)
    }

    /// Issues a fresh session token on success. Unknown email and
    /// wrong password are indistinguishable to the caller.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "Login with unknown email");
                DomainError::InvalidCredentials
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials.into());
        }

        let token = self.sessions.create(&user.email).await;
        info!(user_id = user.id, email = %user.email, "Login successful");
        Ok(token)
    }

    /// Idempotent; logging out an unknown token is a no-op.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) {
        self.sessions.destroy(token).await;
        debug!("Logout processed");
    }

    /// Resolves a session token to its user. None for an absent or
    /// unknown token (anonymous), never an error.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<User>> {
        let Some(token) = token else {
            return Ok(None);
        };
        let Some(email) = self.sessions.resolve(token).await else {
            trace!("Unknown session token, treating as anonymous");
            return Ok(None);
        };
        self.user_repository.find_by_email(&email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::user_repository::InMemoryUserRepository;

    fn service() -> AuthService<InMemoryUserRepository> {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            SessionRegistry::new(),
        )
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Anna".to_string(),
            surname: "Petrova".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let service = service();
        let user = service
            .register(register_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "Abcdef1!");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let service = service();
        let err = service
            .register(register_request("a@b.com", "weak"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service
            .register(register_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();
        let err = service
            .register(register_request("a@b.com", "Ghijkl2?"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_login_issues_fresh_token_per_call() {
        let service = service();
        service
            .register(register_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        let login = || LoginRequest {
            email: "a@b.com".to_string(),
            password: "Abcdef1!".to_string(),
        };
        let first = service.login(login()).await.unwrap();
        let second = service.login(login()).await.unwrap();

        assert_ne!(first, second);
        // Both sessions resolve independently.
        assert!(service.current_user(Some(&first)).await.unwrap().is_some());
        assert!(service.current_user(Some(&second)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_identical() {
        let service = service();
        service
            .register(register_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "Wrong999!".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@b.com".to_string(),
                password: "Abcdef1!".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_current_user_anonymous_cases() {
        let service = service();
        assert!(service.current_user(None).await.unwrap().is_none());
        assert!(
            service
                .current_user(Some("unknown-token"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = service();
        service
            .register(register_request("a@b.com", "Abcdef1!"))
            .await
            .unwrap();
        let token = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "Abcdef1!".to_string(),
            })
            .await
            .unwrap();

        service.logout(&token).await;
        assert!(service.current_user(Some(&token)).await.unwrap().is_none());

        // Second logout is a no-op.
        service.logout(&token).await;
    }
}
