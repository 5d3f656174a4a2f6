use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use onboard_db::Store;
use onboard_db::models::{ConfigRow, UserRow, UserUpdate};
use onboard_types::api::{CreateUserRequest, UpdateUserRequest};
use onboard_types::models::{
    ComponentId, FieldErrors, FormData, OnboardingConfig, Page, ProfileField, UserRecord,
};

use crate::admin::validate_assignment;
use crate::credentials::{PasswordHashing, normalize_email, validate_credentials};
use crate::error::OnboardingError;
use crate::registry;

pub const FINAL_STEP: u8 = 4;

/// The onboarding operations over an injected store. All validation done
/// here is authoritative; clients validate the same rules beforehand.
pub struct OnboardingService<S> {
    store: S,
    passwords: PasswordHashing,
}

impl<S: Store> OnboardingService<S> {
    pub fn new(store: S) -> Self {
        Self::with_password_hashing(store, PasswordHashing::default())
    }

    pub fn with_password_hashing(store: S, passwords: PasswordHashing) -> Self {
        Self { store, passwords }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -- Config --

    /// The active configuration. The default one is created on first read.
    pub fn get_config(&self) -> Result<OnboardingConfig, OnboardingError> {
        if let Some(row) = self.store.latest_config()? {
            return Ok(config_from_row(row));
        }

        let page_2 = component_names(&OnboardingConfig::DEFAULT_PAGE_2);
        let page_3 = component_names(&OnboardingConfig::DEFAULT_PAGE_3);
        let row = self.store.insert_config(&page_2, &page_3)?;
        info!("Created default onboarding configuration {}", row.id);
        Ok(config_from_row(row))
    }

    /// Appends a new configuration, which becomes the active one.
    pub fn save_config(
        &self,
        page_2: &[String],
        page_3: &[String],
    ) -> Result<OnboardingConfig, OnboardingError> {
        let (page_2, page_3) = validate_assignment(page_2, page_3).map_err(|errors| {
            warn!("Rejected onboarding configuration: {}", errors);
            OnboardingError::Validation(errors)
        })?;

        let row = self
            .store
            .insert_config(&component_names(&page_2), &component_names(&page_3))?;
        info!("Saved onboarding configuration {}", row.id);
        Ok(config_from_row(row))
    }

    // -- Users --

    pub fn create_user(&self, req: &CreateUserRequest) -> Result<UserRecord, OnboardingError> {
        let email = normalize_email(&req.email);
        let mut errors = validate_credentials(&email, &req.password);
        if !(1..=2).contains(&req.current_step) {
            errors.insert("current_step", "New records start at step 1 or 2");
        }
        errors.into_result()?;

        let password_hash = self
            .passwords
            .hash(&req.password)
            .map_err(OnboardingError::StoreUnavailable)?;

        let id = Uuid::new_v4();
        let row = self
            .store
            .insert_user(&id.to_string(), &email, &password_hash, i64::from(req.current_step))
            .map_err(|e| {
                let e = OnboardingError::from(e);
                if matches!(e, OnboardingError::DuplicateEmail) {
                    warn!("Rejected duplicate email {}", email);
                }
                e
            })?;

        info!("Created onboarding user {} at step {}", id, req.current_step);
        Ok(record_from_row(row))
    }

    pub fn get_user(&self, id: Uuid) -> Result<UserRecord, OnboardingError> {
        self.store
            .get_user(&id.to_string())?
            .map(record_from_row)
            .ok_or(OnboardingError::NotFound)
    }

    /// Completes the pages between the stored step and `req.current_step`.
    ///
    /// Only fields owned by those pages' components are merged; the merged
    /// form must pass every owned component's validator or nothing is written.
    pub fn update_user(
        &self,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> Result<UserRecord, OnboardingError> {
        let key = id.to_string();
        let row = self.store.get_user(&key)?.ok_or(OnboardingError::NotFound)?;

        let stored = u8::try_from(row.current_step).unwrap_or(FINAL_STEP);
        check_step_advance(stored, req.current_step)?;

        let config = self.get_config()?;
        let components: Vec<ComponentId> = Page::ALL
            .into_iter()
            .filter(|page| (stored..req.current_step).contains(&page.number()))
            .flat_map(|page| config.components(page).iter().copied())
            .collect();
        let owned = registry::owned_fields(&components);

        let mut form = form_from_row(&row);
        let mut fields = Vec::new();
        for field in ProfileField::ALL {
            let Some(value) = req.field(field) else {
                continue;
            };
            if owned.contains(&field) {
                form.set_profile(field, value);
                fields.push((field, value.to_string()));
            } else {
                debug!("Ignoring {} for user {}: not on the submitted pages", field, id);
            }
        }

        let errors = registry::validate_components(&components, &form);
        if !errors.is_empty() {
            warn!("Rejected step {} for user {}: {}", req.current_step, id, errors);
            return Err(OnboardingError::Validation(errors));
        }

        let update = UserUpdate {
            fields,
            expected_step: row.current_step,
            current_step: i64::from(req.current_step),
        };
        let Some(row) = self.store.update_user(&key, &update)? else {
            // Either deleted or advanced by another request since the read
            let current = self.store.get_user(&key)?.ok_or(OnboardingError::NotFound)?;
            warn!(
                "Step {} for user {} lost a race (now at step {})",
                req.current_step, id, current.current_step
            );
            let current = u8::try_from(current.current_step).unwrap_or(FINAL_STEP);
            check_step_advance(current, req.current_step)?;
            return Err(FieldErrors::single(
                "current_step",
                format!("Step changed concurrently (currently {})", current),
            )
            .into());
        };

        info!("User {} advanced to step {}", id, req.current_step);
        Ok(record_from_row(row))
    }

    /// Newest first.
    pub fn list_users(&self) -> Result<Vec<UserRecord>, OnboardingError> {
        Ok(self
            .store
            .list_users()?
            .into_iter()
            .map(record_from_row)
            .collect())
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), OnboardingError> {
        if !self.store.delete_user(&id.to_string())? {
            return Err(OnboardingError::NotFound);
        }
        info!("Deleted onboarding user {}", id);
        Ok(())
    }

    pub fn health(&self) -> Result<(), OnboardingError> {
        self.store.ping()?;
        Ok(())
    }
}

fn check_step_advance(stored: u8, requested: u8) -> Result<(), FieldErrors> {
    let message = if stored >= FINAL_STEP {
        "Onboarding is already complete".to_string()
    } else if requested > FINAL_STEP {
        format!("Step must be at most {}", FINAL_STEP)
    } else if requested <= stored {
        format!("Step can only move forward (currently {})", stored)
    } else {
        return Ok(());
    };
    Err(FieldErrors::single("current_step", message))
}

fn component_names(components: &[ComponentId]) -> Vec<String> {
    components.iter().map(|c| c.to_string()).collect()
}

fn parse_components(raw: &[String], config_id: i64) -> Vec<ComponentId> {
    raw.iter()
        .filter_map(|name| match name.parse::<ComponentId>() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Skipping {} in onboarding configuration {}", e, config_id);
                None
            }
        })
        .collect()
}

fn config_from_row(row: ConfigRow) -> OnboardingConfig {
    OnboardingConfig {
        id: row.id,
        page_2_components: parse_components(&row.page_2_components, row.id),
        page_3_components: parse_components(&row.page_3_components, row.id),
        created_at: parse_timestamp(&row.created_at, "config", &row.id.to_string()),
    }
}

fn form_from_row(row: &UserRow) -> FormData {
    FormData {
        email: row.email.clone(),
        password: String::new(),
        about_me: row.about_me.clone(),
        street_address: row.street_address.clone(),
        city: row.city.clone(),
        state: row.state.clone(),
        zip: row.zip.clone(),
        birthdate: row.birthdate.clone(),
    }
}

fn record_from_row(row: UserRow) -> UserRecord {
    UserRecord {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt user id '{}': {}", row.id, e);
            Uuid::default()
        }),
        current_step: u8::try_from(row.current_step).unwrap_or_else(|_| {
            warn!("Corrupt current_step {} on user '{}'", row.current_step, row.id);
            1
        }),
        created_at: parse_timestamp(&row.created_at, "user", &row.id),
        updated_at: parse_timestamp(&row.updated_at, "user", &row.id),
        email: row.email,
        about_me: row.about_me,
        street_address: row.street_address,
        city: row.city,
        state: row.state,
        zip: row.zip,
        birthdate: row.birthdate,
    }
}

fn parse_timestamp(raw: &str, kind: &str, id: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's datetime('now') format, no timezone
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {} '{}': {}", raw, kind, id, e);
            DateTime::default()
        })
}
