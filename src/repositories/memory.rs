//! In-memory [`UserStore`] used by service and router tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserSummary};
use crate::repositories::UserStore;

/// Rows keyed by username, so iteration order matches `ORDER BY username`.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<BTreeMap<String, User>>,
    next_id: AtomicI32,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail like an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn usernames(&self) -> Vec<String> {
        self.rows.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.rows.lock().unwrap().get(username).cloned()
    }

    fn check_available(&self, operation: &str) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("connection refused"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        self.check_available("insert user")?;
        let mut rows = self.rows.lock().unwrap();

        if rows.contains_key(&new_user.username) {
            return Err(AppError::Duplicate {
                entity: "users".to_string(),
                field: "username".to_string(),
                value: new_user.username,
            });
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: new_user.username,
            name: new_user.name,
            hash: new_user.hash,
            is_admin: new_user.is_admin,
        };
        rows.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.check_available("find user")?;
        Ok(self.rows.lock().unwrap().get(username).cloned())
    }

    async fn list_ordered(&self) -> AppResult<Vec<UserSummary>> {
        self.check_available("list users")?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .cloned()
            .map(UserSummary::from)
            .collect())
    }

    async fn delete_by_usernames(&self, usernames: &[String]) -> AppResult<usize> {
        self.check_available("delete users")?;
        let mut rows = self.rows.lock().unwrap();
        Ok(usernames
            .iter()
            .filter(|name| rows.remove(name.as_str()).is_some())
            .count())
    }

    async fn update_hash(&self, username: &str, hash: &str) -> AppResult<usize> {
        self.check_available("update password")?;
        match self.rows.lock().unwrap().get_mut(username) {
            Some(user) => {
                user.hash = hash.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available("ping database")
    }
}
