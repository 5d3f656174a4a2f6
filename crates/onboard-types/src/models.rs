use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Components --

/// Profile-data collection units an admin can place on page 2 or page 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    AboutMe,
    Address,
    Birthdate,
}

impl ComponentId {
    pub const ALL: [ComponentId; 3] = [Self::AboutMe, Self::Address, Self::Birthdate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AboutMe => "about_me",
            Self::Address => "address",
            Self::Birthdate => "birthdate",
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component '{0}'")]
pub struct UnknownComponent(pub String);

impl FromStr for ComponentId {
    type Err = UnknownComponent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownComponent(s.to_string()))
    }
}

// -- Pages --

/// Configurable wizard page. Serialized as its step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Page {
    Two,
    Three,
}

impl Page {
    pub const ALL: [Page; 2] = [Self::Two, Self::Three];

    pub fn number(&self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Name of the configuration field holding this page's components.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Two => "page_2_components",
            Self::Three => "page_3_components",
        }
    }
}

impl TryFrom<u8> for Page {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("page must be 2 or 3, got {}", other)),
        }
    }
}

impl From<Page> for u8 {
    fn from(page: Page) -> u8 {
        page.number()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page {}", self.number())
    }
}

// -- Profile fields --

/// User record fields written by components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    AboutMe,
    StreetAddress,
    City,
    State,
    Zip,
    Birthdate,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        Self::AboutMe,
        Self::StreetAddress,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Birthdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AboutMe => "about_me",
            Self::StreetAddress => "street_address",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Birthdate => "birthdate",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Validation errors --

/// Field name -> message. Empty means valid.
///
/// Used for both wizard-side and server-side validation so the two render
/// the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Records an error for `field`, keeping the first message if one exists.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

// -- Wizard form state --

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub email: String,
    pub password: String,
    pub about_me: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub birthdate: String,
}

impl FormData {
    pub fn profile(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::AboutMe => &self.about_me,
            ProfileField::StreetAddress => &self.street_address,
            ProfileField::City => &self.city,
            ProfileField::State => &self.state,
            ProfileField::Zip => &self.zip,
            ProfileField::Birthdate => &self.birthdate,
        }
    }

    pub fn set_profile(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::AboutMe => &mut self.about_me,
            ProfileField::StreetAddress => &mut self.street_address,
            ProfileField::City => &mut self.city,
            ProfileField::State => &mut self.state,
            ProfileField::Zip => &mut self.zip,
            ProfileField::Birthdate => &mut self.birthdate,
        };
        *slot = value.into();
    }

    /// Sets a field by its wire name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match name {
            "email" => self.email = value.into(),
            "password" => self.password = value.into(),
            other => match ProfileField::ALL.into_iter().find(|f| f.as_str() == other) {
                Some(field) => self.set_profile(field, value),
                None => return false,
            },
        }
        true
    }
}

// -- Persisted records --

/// A user's onboarding record as exposed to clients. The password hash is
/// never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub about_me: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub birthdate: String,
    pub current_step: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::AboutMe => &self.about_me,
            ProfileField::StreetAddress => &self.street_address,
            ProfileField::City => &self.city,
            ProfileField::State => &self.state,
            ProfileField::Zip => &self.zip,
            ProfileField::Birthdate => &self.birthdate,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step >= 4
    }
}

/// Which components appear on page 2 and page 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub id: i64,
    pub page_2_components: Vec<ComponentId>,
    pub page_3_components: Vec<ComponentId>,
    pub created_at: DateTime<Utc>,
}

impl OnboardingConfig {
    pub const DEFAULT_PAGE_2: [ComponentId; 2] = [ComponentId::AboutMe, ComponentId::Birthdate];
    pub const DEFAULT_PAGE_3: [ComponentId; 1] = [ComponentId::Address];

    pub fn components(&self, page: Page) -> &[ComponentId] {
        match page {
            Page::Two => &self.page_2_components,
            Page::Three => &self.page_3_components,
        }
    }
}
