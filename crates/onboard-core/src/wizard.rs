use tracing::{info, warn};
use uuid::Uuid;

use onboard_types::api::{CreateUserRequest, UpdateUserRequest};
use onboard_types::models::{
    ComponentId, FieldErrors, FormData, OnboardingConfig, Page, ProfileField, UserRecord,
};

use crate::backend::Backend;
use crate::credentials::validate_credentials;
use crate::error::OnboardingError;
use crate::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Email and password.
    Step1,
    /// Components assigned to page 2.
    Step2,
    /// Components assigned to page 3.
    Step3,
    Complete,
}

impl WizardStep {
    /// Maps a stored `current_step` onto the wizard.
    pub fn from_current_step(step: u8) -> Self {
        match step {
            0 | 1 => Self::Step1,
            2 => Self::Step2,
            3 => Self::Step3,
            _ => Self::Complete,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::Step1 => 1,
            Self::Step2 => 2,
            Self::Step3 => 3,
            Self::Complete => 4,
        }
    }

    pub fn page(&self) -> Option<Page> {
        match self {
            Self::Step2 => Some(Page::Two),
            Self::Step3 => Some(Page::Three),
            _ => None,
        }
    }
}

/// Outcome of a successful [`Wizard::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced(WizardStep),
    /// The record reached step 4. The wizard has already reset to a blank
    /// step 1 and dropped its token.
    Completed(UserRecord),
}

/// Client side of the onboarding flow: form state, the current step and
/// the resumability token, driven forward through a [`Backend`].
pub struct Wizard<B> {
    backend: B,
    config: OnboardingConfig,
    step: WizardStep,
    form: FormData,
    token: Option<Uuid>,
    errors: FieldErrors,
}

impl<B: Backend> Wizard<B> {
    /// Loads the active configuration and, when a token is given, resumes
    /// the record it points to. Unknown or completed records start fresh.
    pub async fn start(backend: B, token: Option<Uuid>) -> Result<Self, OnboardingError> {
        let config = backend.get_config().await?;
        let mut wizard = Self {
            backend,
            config,
            step: WizardStep::Step1,
            form: FormData::default(),
            token: None,
            errors: FieldErrors::new(),
        };

        if let Some(id) = token {
            match wizard.backend.get_user(id).await {
                Ok(user) if !user.is_complete() => wizard.resume(user),
                Ok(_) => info!("Onboarding for {} already complete, starting over", id),
                Err(OnboardingError::NotFound) => {
                    warn!("Resume token {} no longer resolves, starting over", id)
                }
                Err(e) => return Err(e),
            }
        }

        Ok(wizard)
    }

    fn resume(&mut self, user: UserRecord) {
        // A stored record already has credentials, so it never resumes at step 1
        self.step = WizardStep::from_current_step(user.current_step.max(2));
        self.token = Some(user.id);
        self.form.email = user.email.clone();
        for field in ProfileField::ALL {
            self.form.set_profile(field, user.profile(field));
        }
        info!("Resumed onboarding for {} at step {}", user.id, self.step.number());
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Components to render for the current step.
    pub fn components(&self) -> &[ComponentId] {
        match self.step.page() {
            Some(page) => self.config.components(page),
            None => &[],
        }
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Sets a form field by wire name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.form.set(name, value)
    }

    /// Errors from the last rejected submit.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The record id to keep for resuming, if one exists.
    pub fn token(&self) -> Option<Uuid> {
        self.token
    }

    /// Validates the current step and, if it passes, submits it.
    pub async fn submit(&mut self) -> Result<Transition, OnboardingError> {
        match self.step {
            WizardStep::Step1 => self.submit_credentials().await,
            WizardStep::Step2 | WizardStep::Step3 => self.submit_page().await,
            WizardStep::Complete => {
                self.reset();
                Ok(Transition::Advanced(WizardStep::Step1))
            }
        }
    }

    async fn submit_credentials(&mut self) -> Result<Transition, OnboardingError> {
        let email = self.form.email.trim().to_string();
        self.check(validate_credentials(&email, &self.form.password))?;

        let request = CreateUserRequest {
            email,
            password: self.form.password.clone(),
            current_step: WizardStep::Step2.number(),
        };

        match self.backend.create_user(request).await {
            Ok(user) => {
                self.token = Some(user.id);
                self.form.email = user.email;
                self.form.password.clear();
                Ok(self.advance(WizardStep::Step2))
            }
            Err(e) => Err(self.record(e)),
        }
    }

    async fn submit_page(&mut self) -> Result<Transition, OnboardingError> {
        let Some(page) = self.step.page() else {
            return Ok(Transition::Advanced(self.step));
        };
        let Some(id) = self.token else {
            warn!("No record to update at step {}, starting over", self.step.number());
            self.reset();
            return Err(OnboardingError::NotFound);
        };

        let components = self.config.components(page).to_vec();
        self.check(registry::validate_components(&components, &self.form))?;

        let owned = registry::owned_fields(&components);
        let request = owned
            .iter()
            .fold(UpdateUserRequest::new(page.number() + 1), |req, field| {
                req.with_field(*field, self.form.profile(*field))
            });

        match self.backend.update_user(id, request).await {
            Ok(user) if page == Page::Three => {
                info!("Onboarding complete for {}", user.id);
                self.reset();
                Ok(Transition::Completed(user))
            }
            Ok(_) => Ok(self.advance(WizardStep::Step3)),
            Err(OnboardingError::NotFound) => {
                warn!("Record {} is gone, starting over", id);
                self.reset();
                Err(OnboardingError::NotFound)
            }
            Err(OnboardingError::Validation(errors)) => {
                // Fields this page does not show mean the configuration changed
                if errors
                    .iter()
                    .any(|(name, _)| !owned.iter().any(|f| f.as_str() == name))
                {
                    self.refresh_config().await;
                }
                Err(self.record(OnboardingError::Validation(errors)))
            }
            Err(e) => Err(self.record(e)),
        }
    }

    async fn refresh_config(&mut self) {
        match self.backend.get_config().await {
            Ok(config) => self.config = config,
            Err(e) => warn!("Failed to reload onboarding configuration: {}", e),
        }
    }

    fn check(&mut self, errors: FieldErrors) -> Result<(), OnboardingError> {
        if errors.is_empty() {
            return Ok(());
        }
        self.errors = errors.clone();
        Err(OnboardingError::Validation(errors))
    }

    fn record(&mut self, e: OnboardingError) -> OnboardingError {
        self.errors = e.field_errors();
        e
    }

    fn advance(&mut self, step: WizardStep) -> Transition {
        self.step = step;
        self.errors = FieldErrors::new();
        Transition::Advanced(step)
    }

    fn reset(&mut self) {
        self.step = WizardStep::Step1;
        self.form = FormData::default();
        self.token = None;
        self.errors = FieldErrors::new();
    }
}
