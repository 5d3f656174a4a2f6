use onboard_db::StoreError;
use onboard_types::models::FieldErrors;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists";

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// One or more fields failed validation. Re-prompt and resubmit.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("email already exists")]
    DuplicateEmail,

    /// The identifier no longer resolves to a record.
    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl OnboardingError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::DuplicateEmail => "duplicate_email",
            Self::NotFound => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Field-keyed view of the error, for rendering next to inputs.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Validation(errors) => errors.clone(),
            Self::DuplicateEmail => FieldErrors::single("email", DUPLICATE_EMAIL_MESSAGE),
            _ => FieldErrors::new(),
        }
    }
}

impl From<StoreError> for OnboardingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Unavailable(e) => Self::StoreUnavailable(e),
        }
    }
}

impl From<FieldErrors> for OnboardingError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
