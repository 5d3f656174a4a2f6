//! Component registry: each component identifier maps to a label, the
//! profile fields it owns and a validator over the form state.
//!
//! New components are added as an enum variant plus a table entry here.

use onboard_types::models::{ComponentId, FieldErrors, FormData, ProfileField};

pub struct ComponentSpec {
    pub id: ComponentId,
    pub label: &'static str,
    pub fields: &'static [ProfileField],
    validator: fn(&FormData) -> FieldErrors,
}

impl ComponentSpec {
    /// Empty when every owned field is acceptable.
    pub fn validate(&self, form: &FormData) -> FieldErrors {
        (self.validator)(form)
    }
}

static REGISTRY: [ComponentSpec; 3] = [
    ComponentSpec {
        id: ComponentId::AboutMe,
        label: "About Me",
        fields: &[ProfileField::AboutMe],
        validator: validate_about_me,
    },
    ComponentSpec {
        id: ComponentId::Address,
        label: "Address",
        fields: &[
            ProfileField::StreetAddress,
            ProfileField::City,
            ProfileField::State,
            ProfileField::Zip,
        ],
        validator: validate_address,
    },
    ComponentSpec {
        id: ComponentId::Birthdate,
        label: "Birthdate",
        fields: &[ProfileField::Birthdate],
        validator: validate_birthdate,
    },
];

pub fn lookup(id: ComponentId) -> &'static ComponentSpec {
    match id {
        ComponentId::AboutMe => &REGISTRY[0],
        ComponentId::Address => &REGISTRY[1],
        ComponentId::Birthdate => &REGISTRY[2],
    }
}

/// Every component, in registry order.
pub fn all() -> &'static [ComponentSpec] {
    &REGISTRY
}

/// Validates every listed component together and merges their errors.
pub fn validate_components(ids: &[ComponentId], form: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for id in ids {
        errors.merge(lookup(*id).validate(form));
    }
    errors
}

/// Profile fields written by the given components, in component order.
pub fn owned_fields(ids: &[ComponentId]) -> Vec<ProfileField> {
    let mut fields = Vec::new();
    for id in ids {
        for field in lookup(*id).fields {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
    }
    fields
}

fn require_trimmed(form: &FormData, field: ProfileField, message: &str, errors: &mut FieldErrors) {
    if form.profile(field).trim().is_empty() {
        errors.insert(field.as_str(), message);
    }
}

fn validate_about_me(form: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require_trimmed(form, ProfileField::AboutMe, "About Me is required", &mut errors);
    errors
}

// All four parts are checked so every missing one is reported at once.
fn validate_address(form: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require_trimmed(form, ProfileField::StreetAddress, "Street address is required", &mut errors);
    require_trimmed(form, ProfileField::City, "City is required", &mut errors);
    require_trimmed(form, ProfileField::State, "State is required", &mut errors);
    require_trimmed(form, ProfileField::Zip, "ZIP code is required", &mut errors);
    errors
}

fn validate_birthdate(form: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if form.birthdate.is_empty() {
        errors.insert(ProfileField::Birthdate.as_str(), "Birthdate is required");
    }
    errors
}
