pub mod admin;
pub mod backend;
pub mod credentials;
pub mod error;
pub mod registry;
pub mod service;
pub mod wizard;

pub use admin::{AssignmentEditor, Availability, EditorError};
pub use backend::Backend;
pub use error::OnboardingError;
pub use service::OnboardingService;
pub use wizard::{Transition, Wizard, WizardStep};
