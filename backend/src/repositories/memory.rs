//! Process-local stores used by tests and for running without Postgres.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::event::Event;
use crate::models::user::UserAccount;
use crate::repositories::event::EventRepository;
use crate::repositories::user::UserRepository;
use crate::types::{EventId, UserId};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Other(anyhow::anyhow!("in-memory store lock poisoned")))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Other(anyhow::anyhow!("in-memory store lock poisoned")))
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(
        users: &HashMap<UserId, UserAccount>,
        candidate: &UserAccount,
    ) -> Result<(), StoreError> {
        for existing in users.values().filter(|u| u.id != candidate.id) {
            if existing.username == candidate.username {
                return Err(StoreError::Duplicate("users_username_key".into()));
            }
            if existing.email == candidate.email {
                return Err(StoreError::Duplicate("users_email_key".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &UserAccount) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        Self::check_unique(&users, user)?;
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn record_login(&self, id: UserId, token: &str) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.current_token = Some(token.to_string());
        Ok(())
    }

    async fn take_current_token(&self, id: UserId) -> Result<Option<String>, StoreError> {
        let mut users = write(&self.users)?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        Ok(user.current_token.take())
    }

    async fn begin_reset(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.begin_reset(token.to_string(), expires_at);
        Ok(())
    }

    async fn complete_reset(
        &self,
        id: UserId,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut users = write(&self.users)?;
        match users.get_mut(&id) {
            Some(user) if user.reset_token_is_valid(token, now) => {
                user.password_hash = password_hash.to_string();
                user.clear_reset();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        write(&self.users)?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: &Event) -> Result<(), StoreError> {
        write(&self.events)?.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(read(&self.events)?.get(&id).cloned())
    }

    async fn update(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = write(&self.events)?;
        match events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: EventId) -> Result<(), StoreError> {
        write(&self.events)?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
