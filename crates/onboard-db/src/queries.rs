use rusqlite::{Connection, OptionalExtension, Row, ffi, types::ToSql};

use crate::models::{ConfigRow, UserRow, UserUpdate};
use crate::{Database, Store, StoreError, now_timestamp};

const USER_COLUMNS: &str = "id, email, password, about_me, street_address, city, state, zip, \
                            birthdate, current_step, created_at, updated_at";

impl Store for Database {
    // -- Users --

    fn insert_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        current_step: i64,
    ) -> Result<UserRow, StoreError> {
        let now = now_timestamp();
        self.with_conn(|conn| {
            // The UNIQUE constraint makes the duplicate check atomic with the insert
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password, current_step, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![id, email, password_hash, current_step, now],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    return Err(StoreError::DuplicateEmail);
                }
                Err(e) => return Err(e.into()),
            }

            Ok(UserRow {
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
            })
        })
    }

    fn get_user(&self, id: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<UserRow>, StoreError> {
        let now = now_timestamp();
        self.with_conn(|conn| {
            // Column names come from the closed ProfileField enum
            let mut sets: Vec<String> = update
                .fields
                .iter()
                .enumerate()
                .map(|(i, (field, _))| format!("{} = ?{}", field.as_str(), i + 1))
                .collect();
            let n = update.fields.len();
            sets.push(format!("current_step = ?{}", n + 1));
            sets.push(format!("updated_at = ?{}", n + 2));
            let sql = format!(
                "UPDATE users SET {} WHERE id = ?{} AND current_step = ?{}",
                sets.join(", "),
                n + 3,
                n + 4
            );

            let mut params: Vec<&dyn ToSql> = update
                .fields
                .iter()
                .map(|(_, value)| value as &dyn ToSql)
                .collect();
            params.push(&update.current_step);
            params.push(&now);
            params.push(&id);
            params.push(&update.expected_step);

            let changed = conn.execute(&sql, params.as_slice())?;
            if changed == 0 {
                return Ok(None);
            }
            query_user_by_id(conn, id)
        })
    }

    fn list_users(&self) -> Result<Vec<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users ORDER BY created_at DESC, rowid DESC",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    // -- Config --

    fn latest_config(&self) -> Result<Option<ConfigRow>, StoreError> {
        self.with_conn(|conn| {
            let raw = conn
                .query_row(
                    "SELECT id, page_2_components, page_3_components, created_at
                     FROM onboarding_config ORDER BY id DESC LIMIT 1",
                    [],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;

            let Some((id, page_2, page_3, created_at)) = raw else {
                return Ok(None);
            };

            Ok(Some(ConfigRow {
                id,
                page_2_components: serde_json::from_str(&page_2)?,
                page_3_components: serde_json::from_str(&page_3)?,
                created_at,
            }))
        })
    }

    fn insert_config(&self, page_2: &[String], page_3: &[String]) -> Result<ConfigRow, StoreError> {
        let page_2_json = serde_json::to_string(page_2)?;
        let page_3_json = serde_json::to_string(page_3)?;
        let now = now_timestamp();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO onboarding_config (page_2_components, page_3_components, created_at)
                 VALUES (?1, ?2, ?3)",
                (&page_2_json, &page_3_json, &now),
            )?;

            Ok(ConfigRow {
                id: conn.last_insert_rowid(),
                page_2_components: page_2.to_vec(),
                page_3_components: page_3.to_vec(),
                created_at: now,
            })
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>, StoreError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        about_me: row.get(3)?,
        street_address: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        zip: row.get(7)?,
        birthdate: row.get(8)?,
        current_step: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_types::models::ProfileField;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let db = db();
        db.insert_user("u1", "a@b.com", "hash", 2).unwrap();

        let err = db.insert_user("u2", "A@B.com", "hash", 2).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let db = db();
        db.insert_user("u1", "a@b.com", "hash", 2).unwrap();

        let first = UserUpdate {
            fields: vec![(ProfileField::AboutMe, "hi".into())],
            expected_step: 2,
            current_step: 3,
        };
        db.update_user("u1", &first).unwrap().unwrap();

        let second = UserUpdate {
            fields: vec![(ProfileField::City, "Austin".into())],
            expected_step: 3,
            current_step: 4,
        };
        let row = db.update_user("u1", &second).unwrap().unwrap();
        assert_eq!(row.about_me, "hi");
        assert_eq!(row.city, "Austin");
        assert_eq!(row.current_step, 4);
    }

    #[test]
    fn update_of_unknown_user_returns_none() {
        let db = db();
        let update = UserUpdate {
            fields: vec![],
            expected_step: 2,
            current_step: 3,
        };
        assert!(db.update_user("missing", &update).unwrap().is_none());
    }

    #[test]
    fn stale_step_does_not_overwrite() {
        let db = db();
        db.insert_user("u1", "a@b.com", "hash", 2).unwrap();

        let finish = UserUpdate {
            fields: vec![(ProfileField::Zip, "78701".into())],
            expected_step: 2,
            current_step: 4,
        };
        db.update_user("u1", &finish).unwrap().unwrap();

        // A second writer that also read step 2 loses
        let late = UserUpdate {
            fields: vec![(ProfileField::AboutMe, "late".into())],
            expected_step: 2,
            current_step: 3,
        };
        assert!(db.update_user("u1", &late).unwrap().is_none());

        let row = db.get_user("u1").unwrap().unwrap();
        assert_eq!(row.current_step, 4);
        assert_eq!(row.about_me, "");
    }

    #[test]
    fn check_constraint_is_not_a_duplicate_email() {
        let db = db();
        let err = db.insert_user("u1", "a@b.com", "hash", 9).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn users_list_newest_first() {
        let db = db();
        db.insert_user("u1", "one@b.com", "hash", 2).unwrap();
        db.insert_user("u2", "two@b.com", "hash", 2).unwrap();
        db.insert_user("u3", "three@b.com", "hash", 2).unwrap();

        let ids: Vec<String> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["u3", "u2", "u1"]);

        assert!(db.delete_user("u2").unwrap());
        assert!(!db.delete_user("u2").unwrap());
        assert_eq!(db.list_users().unwrap().len(), 2);
    }

    #[test]
    fn latest_config_is_the_last_inserted() {
        let db = db();
        assert!(db.latest_config().unwrap().is_none());

        db.insert_config(&["about_me".into()], &["address".into(), "birthdate".into()])
            .unwrap();
        let second = db
            .insert_config(&["address".into()], &["about_me".into()])
            .unwrap();

        let latest = db.latest_config().unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.page_2_components, vec!["address"]);
        assert_eq!(latest.page_3_components, vec!["about_me"]);
    }
}
