use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

struct UserTable {
    next_id: u32,
    by_id: HashMap<u32, User>,
}

/// In-memory credential store. Email uniqueness is enforced inside a
/// single write-lock section, so the check and the insert cannot race.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(UserTable {
                next_id: 1,
                by_id: HashMap::new(),
            })),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, user: NewUser) -> Result<User> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        if storage.by_id.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "Email already registered");
            return Err(DomainError::DuplicateEmail.into());
        }
        let id = storage.next_id;
        storage.next_id += 1;
        let user = User {
            id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            password_hash: user.password_hash,
        };
        storage.by_id.insert(id, user.clone());
        debug!(user_id = user.id, email = %user.email, "User inserted");
        Ok(user)
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage.by_id.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, "User found by email"),
            None => trace!(email = email, "No user with this email"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_by_id(&self, id: u32) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        Ok(storage.by_id.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ivan".to_string(),
            surname: "Sidorov".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let first = repo.insert(new_user("one@example.com")).await.unwrap();
        let second = repo.insert(new_user("two@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("dup@example.com")).await.unwrap();

        let err = repo.insert(new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_exactly_one_succeeds() {
        let repo = InMemoryUserRepository::new();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert(new_user("race@example.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("Case@Example.com")).await.unwrap();

        assert!(
            repo.find_by_email("Case@Example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.find_by_email("case@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_by_id_returns_none_for_unknown() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_round_trip() {
        let repo = InMemoryUserRepository::new();
        let user = repo.insert(new_user("id@example.com")).await.unwrap();
        let found = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.email, "id@example.com");
        assert_eq!(found.name, "Ivan");
    }
}
