use tracing::info;

use onboard_types::api::SaveConfigRequest;
use onboard_types::models::{ComponentId, FieldErrors, OnboardingConfig, Page};

use crate::backend::Backend;
use crate::error::OnboardingError;
use crate::registry;

pub const EMPTY_PAGES_MESSAGE: &str = "Each page must have at least one component";

/// Where a known component currently sits in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Assigned(Page),
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("{0} must have at least one component")]
    EmptyPage(Page),

    #[error("{component} is not on {page}")]
    NotOnPage { component: ComponentId, page: Page },

    #[error("{component} is already assigned to {page}")]
    AlreadyAssigned { component: ComponentId, page: Page },
}

/// Working copy of the page assignment. Nothing is persisted until `save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentEditor {
    page_2: Vec<ComponentId>,
    page_3: Vec<ComponentId>,
}

impl AssignmentEditor {
    pub fn from_config(config: &OnboardingConfig) -> Self {
        Self {
            page_2: config.page_2_components.clone(),
            page_3: config.page_3_components.clone(),
        }
    }

    pub fn components(&self, page: Page) -> &[ComponentId] {
        match page {
            Page::Two => &self.page_2,
            Page::Three => &self.page_3,
        }
    }

    fn components_mut(&mut self, page: Page) -> &mut Vec<ComponentId> {
        match page {
            Page::Two => &mut self.page_2,
            Page::Three => &mut self.page_3,
        }
    }

    pub fn page_of(&self, component: ComponentId) -> Option<Page> {
        Page::ALL
            .into_iter()
            .find(|page| self.components(*page).contains(&component))
    }

    /// Moves `component` to the end of `to`. Rejected without any change if
    /// it would leave `from` empty.
    pub fn move_component(
        &mut self,
        component: ComponentId,
        from: Page,
        to: Page,
    ) -> Result<(), EditorError> {
        if from == to {
            return Ok(());
        }

        let source = self.components(from);
        if !source.contains(&component) {
            return Err(EditorError::NotOnPage { component, page: from });
        }
        if source.len() == 1 {
            return Err(EditorError::EmptyPage(from));
        }

        self.components_mut(from).retain(|c| *c != component);
        self.components_mut(to).push(component);
        Ok(())
    }

    /// Adds a component that is on neither page.
    pub fn add_component(&mut self, component: ComponentId, page: Page) -> Result<(), EditorError> {
        if let Some(current) = self.page_of(component) {
            return Err(EditorError::AlreadyAssigned { component, page: current });
        }
        self.components_mut(page).push(component);
        Ok(())
    }

    /// Every known component with its placement. Only `Unassigned` ones can
    /// be added.
    pub fn availability(&self) -> Vec<(ComponentId, Availability)> {
        registry::all()
            .iter()
            .map(|entry| entry.id)
            .map(|c| match self.page_of(c) {
                Some(page) => (c, Availability::Assigned(page)),
                None => (c, Availability::Unassigned),
            })
            .collect()
    }

    pub fn to_request(&self) -> SaveConfigRequest {
        SaveConfigRequest {
            page_2_components: self.page_2.iter().map(|c| c.to_string()).collect(),
            page_3_components: self.page_3.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Checks the assignment locally, then stores it as the new active
    /// configuration.
    pub async fn save<B: Backend>(&self, backend: &B) -> Result<OnboardingConfig, OnboardingError> {
        let request = self.to_request();
        validate_assignment(&request.page_2_components, &request.page_3_components)?;

        let config = backend.save_config(request).await?;
        info!(
            "Saved onboarding configuration {} (page 2: {:?}, page 3: {:?})",
            config.id, config.page_2_components, config.page_3_components
        );
        Ok(config)
    }
}

/// Parses and checks a page assignment: known identifiers only, both pages
/// non-empty, no component listed twice on either or across pages.
pub fn validate_assignment(
    page_2: &[String],
    page_3: &[String],
) -> Result<(Vec<ComponentId>, Vec<ComponentId>), FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut seen: Vec<(ComponentId, Page)> = Vec::new();
    let mut parsed = (Vec::new(), Vec::new());

    for (page, raw) in [(Page::Two, page_2), (Page::Three, page_3)] {
        let key = page.config_key();
        if raw.is_empty() {
            errors.insert(key, EMPTY_PAGES_MESSAGE);
            continue;
        }

        for name in raw {
            let component = match name.parse::<ComponentId>() {
                Ok(c) => c,
                Err(_) => {
                    errors.insert(key, format!("Unknown component '{}'", name));
                    continue;
                }
            };

            match seen.iter().find(|(c, _)| *c == component) {
                Some((_, other)) if *other == page => {
                    errors.insert(
                        key,
                        format!("Component '{}' is listed more than once", component),
                    );
                }
                Some((_, other)) => {
                    errors.insert(
                        key,
                        format!(
                            "Component '{}' is already assigned to page {}",
                            component,
                            other.number()
                        ),
                    );
                }
                None => {
                    seen.push((component, page));
                    match page {
                        Page::Two => parsed.0.push(component),
                        Page::Three => parsed.1.push(component),
                    }
                }
            }
        }
    }

    errors.into_result().map(|_| parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::PasswordHashing;
    use crate::service::OnboardingService;
    use onboard_db::{MemoryStore, Store};

    fn service() -> OnboardingService<MemoryStore> {
        OnboardingService::with_password_hashing(
            MemoryStore::new(),
            PasswordHashing::with_cost(8, 1).unwrap(),
        )
    }

    fn default_editor() -> AssignmentEditor {
        AssignmentEditor {
            page_2: vec![ComponentId::AboutMe, ComponentId::Birthdate],
            page_3: vec![ComponentId::Address],
        }
    }

    fn assert_invariants(editor: &AssignmentEditor) {
        assert!(!editor.components(Page::Two).is_empty());
        assert!(!editor.components(Page::Three).is_empty());
        for c in editor.components(Page::Two) {
            assert!(!editor.components(Page::Three).contains(c));
        }
    }

    #[test]
    fn move_appends_to_destination() {
        let mut editor = default_editor();
        editor
            .move_component(ComponentId::AboutMe, Page::Two, Page::Three)
            .unwrap();

        assert_eq!(editor.components(Page::Two), &[ComponentId::Birthdate]);
        assert_eq!(
            editor.components(Page::Three),
            &[ComponentId::Address, ComponentId::AboutMe]
        );
        assert_invariants(&editor);
    }

    #[test]
    fn move_from_singleton_page_is_rejected_unchanged() {
        let mut editor = default_editor();
        let before = editor.clone();

        let err = editor
            .move_component(ComponentId::Address, Page::Three, Page::Two)
            .unwrap_err();
        assert_eq!(err, EditorError::EmptyPage(Page::Three));
        assert_eq!(err.to_string(), "Page 3 must have at least one component");
        assert_eq!(editor, before);
    }

    #[test]
    fn move_to_same_page_is_noop() {
        let mut editor = default_editor();
        let before = editor.clone();
        editor
            .move_component(ComponentId::Address, Page::Three, Page::Three)
            .unwrap();
        assert_eq!(editor, before);
    }

    #[test]
    fn move_of_component_not_on_source_is_rejected() {
        let mut editor = default_editor();
        let err = editor
            .move_component(ComponentId::Address, Page::Two, Page::Three)
            .unwrap_err();
        assert!(matches!(err, EditorError::NotOnPage { .. }));
    }

    #[test]
    fn availability_and_add() {
        let mut editor = AssignmentEditor {
            page_2: vec![ComponentId::AboutMe],
            page_3: vec![ComponentId::Address],
        };
        assert_eq!(
            editor.availability(),
            vec![
                (ComponentId::AboutMe, Availability::Assigned(Page::Two)),
                (ComponentId::Address, Availability::Assigned(Page::Three)),
                (ComponentId::Birthdate, Availability::Unassigned),
            ]
        );

        editor.add_component(ComponentId::Birthdate, Page::Three).unwrap();
        assert_eq!(
            editor.add_component(ComponentId::Birthdate, Page::Two),
            Err(EditorError::AlreadyAssigned {
                component: ComponentId::Birthdate,
                page: Page::Three
            })
        );
        assert_invariants(&editor);
    }

    #[test]
    fn validate_assignment_rules() {
        let ok = validate_assignment(&["address".into()], &["about_me".into(), "birthdate".into()]);
        assert_eq!(
            ok.unwrap(),
            (
                vec![ComponentId::Address],
                vec![ComponentId::AboutMe, ComponentId::Birthdate]
            )
        );

        let empty = validate_assignment(&[], &["address".into()]).unwrap_err();
        assert_eq!(empty.get("page_2_components"), Some(EMPTY_PAGES_MESSAGE));

        let overlap =
            validate_assignment(&["address".into()], &["address".into()]).unwrap_err();
        assert!(overlap.contains("page_3_components"));

        let unknown = validate_assignment(&["avatar".into()], &["address".into()]).unwrap_err();
        assert_eq!(unknown.get("page_2_components"), Some("Unknown component 'avatar'"));

        let twice = validate_assignment(
            &["address".into(), "address".into()],
            &["birthdate".into()],
        )
        .unwrap_err();
        assert!(twice.contains("page_2_components"));
    }

    #[tokio::test]
    async fn save_round_trips_through_the_backend() {
        let service = service();
        let config = Backend::get_config(&service).await.unwrap();

        let mut editor = AssignmentEditor::from_config(&config);
        editor
            .move_component(ComponentId::Birthdate, Page::Two, Page::Three)
            .unwrap();
        let saved = editor.save(&service).await.unwrap();

        assert_eq!(saved.page_2_components, vec![ComponentId::AboutMe]);
        assert_eq!(
            saved.page_3_components,
            vec![ComponentId::Address, ComponentId::Birthdate]
        );
        assert_eq!(Backend::get_config(&service).await.unwrap(), saved);
        assert_eq!(AssignmentEditor::from_config(&saved), editor);
    }

    #[tokio::test]
    async fn save_rejects_empty_page_without_calling_the_backend() {
        let service = service();
        let editor = AssignmentEditor {
            page_2: vec![],
            page_3: ComponentId::ALL.to_vec(),
        };

        let err = editor.save(&service).await.unwrap_err();
        assert_eq!(
            err.field_errors().get("page_2_components"),
            Some(EMPTY_PAGES_MESSAGE)
        );
        assert!(service.store().latest_config().unwrap().is_none());
    }
}
