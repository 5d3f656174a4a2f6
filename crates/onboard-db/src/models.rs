//! Database row types. These map directly to SQLite rows and are kept
//! separate from the onboard-types API models.

use onboard_types::models::ProfileField;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub about_me: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub birthdate: String,
    pub current_step: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub(crate) fn set_field(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::AboutMe => self.about_me = value,
            ProfileField::StreetAddress => self.street_address = value,
            ProfileField::City => self.city = value,
            ProfileField::State => self.state = value,
            ProfileField::Zip => self.zip = value,
            ProfileField::Birthdate => self.birthdate = value,
        }
    }
}

/// Profile fields to overwrite plus the new step. Applied only while the
/// stored step still equals `expected_step`.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub fields: Vec<(ProfileField, String)>,
    pub expected_step: i64,
    pub current_step: i64,
}

/// Component lists are stored as JSON arrays of identifiers.
#[derive(Debug, Clone)]
pub struct ConfigRow {
    pub id: i64,
    pub page_2_components: Vec<String>,
    pub page_3_components: Vec<String>,
    pub created_at: String,
}
