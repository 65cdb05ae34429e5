//! In-memory [`AccountStore`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use everato_auth::Principal;
use everato_models::{Admin, User};

use crate::store::{AccountStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    admins: RwLock<HashMap<Uuid, Admin>>,
    users: RwLock<HashMap<String, User>>,
    unavailable: AtomicBool,
    principal_lookups: AtomicUsize,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_admin(&self, admin: Admin) {
        self.admins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(admin.id, admin);
    }

    pub fn remove_admin(&self, id: Uuid) {
        self.admins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    pub fn insert_user(&self, user: User) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.email.clone(), user);
    }

    /// Makes every lookup fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of [`AccountStore::principal_by_id`] calls so far.
    pub fn principal_lookups(&self) -> usize {
        self.principal_lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn principal_by_id(&self, id: &str) -> Result<Principal, StoreError> {
        self.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;

        self.admins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(Admin::principal)
            .ok_or(StoreError::NotFound)
    }

    async fn admin_by_email(&self, email: &str) -> Result<Admin, StoreError> {
        self.check_available()?;

        self.admins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|admin| admin.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.check_available()?;

        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn user_by_id(&self, id: &str) -> Result<User, StoreError> {
        self.check_available()?;
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound)?;

        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|user| user.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
