//! In-memory user storage.

use crate::error::{UserError, UserResult};
use crate::model::User;
use async_trait::async_trait;
use kinero_core::{IdentityStore, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    by_id: HashMap<Uuid, User>,
    id_by_email: HashMap<String, Uuid>,
}

/// Thread-safe, cloneable user store indexed by id and by email.
///
/// Clones share the same data. The lock is never held across `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new user.
    ///
    /// The email check and the insert happen under one write lock, so two
    /// concurrent registrations of the same email cannot both succeed.
    pub fn insert(&self, user: User) -> UserResult<User> {
        let mut tables = self.tables.write();
        if tables.id_by_email.contains_key(&user.email) {
            return Err(UserError::AlreadyExists {
                field: "email",
                value: user.email,
            });
        }

        tables.id_by_email.insert(user.email.clone(), user.id);
        tables.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    /// Finds a user by id.
    #[must_use]
    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.tables.read().by_id.get(&id).cloned()
    }

    /// Finds a user by exact email.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let tables = self.tables.read();
        let id = tables.id_by_email.get(email)?;
        tables.by_id.get(id).cloned()
    }

    /// Applies `f` to the user with `id` and returns the updated record.
    ///
    /// The email is not changeable through this method.
    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut User)) -> Option<User> {
        let mut tables = self.tables.write();
        let user = tables.by_id.get_mut(&id)?;
        let email = user.email.clone();
        f(user);
        user.email = email;
        Some(user.clone())
    }

    /// Removes the user with `id`, returning it.
    pub fn delete(&self, id: Uuid) -> Option<User> {
        let mut tables = self.tables.write();
        let user = tables.by_id.remove(&id)?;
        tables.id_by_email.remove(&user.email);
        Some(user)
    }

    /// Returns the number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    /// Returns `true` if no users are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserStore {
    type Record = User;

    async fn find_by_subject(&self, subject: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_by_email(subject))
    }
}
