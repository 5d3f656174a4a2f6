use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FieldErrors, ProfileField};

// -- Config --

/// Component identifiers arrive as plain strings so unknown names can be
/// reported per page instead of failing the whole body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveConfigRequest {
    pub page_2_components: Vec<String>,
    pub page_3_components: Vec<String>,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_initial_step")]
    pub current_step: u8,
}

fn default_initial_step() -> u8 {
    1
}

/// Partial profile update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    pub current_step: u8,
}

impl UpdateUserRequest {
    pub fn new(current_step: u8) -> Self {
        Self {
            current_step,
            ..Self::default()
        }
    }

    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::AboutMe => self.about_me.as_deref(),
            ProfileField::StreetAddress => self.street_address.as_deref(),
            ProfileField::City => self.city.as_deref(),
            ProfileField::State => self.state.as_deref(),
            ProfileField::Zip => self.zip.as_deref(),
            ProfileField::Birthdate => self.birthdate.as_deref(),
        }
    }

    pub fn with_field(mut self, field: ProfileField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            ProfileField::AboutMe => self.about_me = value,
            ProfileField::StreetAddress => self.street_address = value,
            ProfileField::City => self.city = value,
            ProfileField::State => self.state = value,
            ProfileField::Zip => self.zip = value,
            ProfileField::Birthdate => self.birthdate = value,
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub deleted: Uuid,
}

// -- Health --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    pub fields: FieldErrors,
}
