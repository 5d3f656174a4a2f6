use std::sync::Mutex;

use crate::models::{ConfigRow, UserRow, UserUpdate};
use crate::{Store, StoreError, now_timestamp};

/// In-process store with the same guarantees as [`crate::Database`]:
/// case-insensitive unique emails checked under the same lock as the insert,
/// newest-first listing, append-only configurations.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Insertion order is creation order.
    users: Vec<UserRow>,
    configs: Vec<ConfigRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Inner) -> Result<T, StoreError>,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("Memory store lock poisoned: {}", e))?;
        f(&mut inner)
    }
}

impl Store for MemoryStore {
    fn insert_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        current_step: i64,
    ) -> Result<UserRow, StoreError> {
        self.with_inner(|inner| {
            if inner
                .users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(email) || u.id == id)
            {
                return Err(StoreError::DuplicateEmail);
            }

            let now = now_timestamp();
            let row = UserRow {
                id: id.to_string(),
                email: email.to_string(),
                password: password_hash.to_string(),
                about_me: String::new(),
                street_address: String::new(),
                city: String::new(),
                state: String::new(),
                zip: String::new(),
                birthdate: String::new(),
                current_step,
                created_at: now.clone(),
                updated_at: now,
            };
            inner.users.push(row.clone());
            Ok(row)
        })
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_inner(|inner| Ok(inner.users.iter().find(|u| u.id == id).cloned()))
    }

    fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<UserRow>, StoreError> {
        self.with_inner(|inner| {
            let Some(row) = inner
                .users
                .iter_mut()
                .find(|u| u.id == id && u.current_step == update.expected_step)
            else {
                return Ok(None);
            };
            for (field, value) in &update.fields {
                row.set_field(*field, value.clone());
            }
            row.current_step = update.current_step;
            row.updated_at = now_timestamp();
            Ok(Some(row.clone()))
        })
    }

    fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        self.with_inner(|inner| Ok(inner.users.iter().rev().cloned().collect()))
    }

    fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        self.with_inner(|inner| {
            let before = inner.users.len();
            inner.users.retain(|u| u.id != id);
            Ok(inner.users.len() < before)
        })
    }

    fn latest_config(&self) -> Result<Option<ConfigRow>, StoreError> {
        self.with_inner(|inner| Ok(inner.configs.last().cloned()))
    }

    fn insert_config(&self, page_2: &[String], page_3: &[String]) -> Result<ConfigRow, StoreError> {
        self.with_inner(|inner| {
            let row = ConfigRow {
                id: inner.configs.len() as i64 + 1,
                page_2_components: page_2.to_vec(),
                page_3_components: page_3.to_vec(),
                created_at: now_timestamp(),
            };
            inner.configs.push(row.clone());
            Ok(row)
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.with_inner(|_| Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_types::models::ProfileField;

    #[test]
    fn behaves_like_the_sqlite_store() {
        let store = MemoryStore::new();
        store.insert_user("u1", "a@b.com", "hash", 2).unwrap();
        assert!(matches!(
            store.insert_user("u2", "A@b.COM", "hash", 2),
            Err(StoreError::DuplicateEmail)
        ));

        store.insert_user("u2", "c@d.com", "hash", 2).unwrap();
        let ids: Vec<String> = store.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["u2", "u1"]);

        let update = UserUpdate {
            fields: vec![(ProfileField::Zip, "10001".into())],
            expected_step: 2,
            current_step: 3,
        };
        let row = store.update_user("u1", &update).unwrap().unwrap();
        assert_eq!(row.zip, "10001");
        assert_eq!(row.current_step, 3);
        // Replaying the same update finds the step already moved
        assert!(store.update_user("u1", &update).unwrap().is_none());

        assert!(store.delete_user("u1").unwrap());
        assert!(store.get_user("u1").unwrap().is_none());
    }
}
