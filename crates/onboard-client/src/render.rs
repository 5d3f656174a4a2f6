//! Plain-text rendering for the terminal client.

use onboard_core::{Availability, WizardStep};
use onboard_types::models::{FieldErrors, ProfileField, UserRecord};

/// Progress line such as `✓ Account  [2] Profile  [3] Details`.
pub fn progress(step: WizardStep) -> String {
    const NAMES: [&str; 3] = ["Account", "Profile", "Details"];

    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let n = i as u8 + 1;
            if n < step.number() {
                format!("✓ {}", name)
            } else {
                format!("[{}] {}", n, name)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Status shown for a stored `current_step`.
pub fn step_status(current_step: u8) -> &'static str {
    match current_step {
        0 | 1 => "Step 1 - Account Creation",
        2 => "Step 2 - Profile Info",
        3 => "Step 3 - Additional Info",
        _ => "Completed",
    }
}

pub fn field_label(field: ProfileField) -> &'static str {
    match field {
        ProfileField::AboutMe => "About Me",
        ProfileField::StreetAddress => "Street Address",
        ProfileField::City => "City",
        ProfileField::State => "State",
        ProfileField::Zip => "ZIP Code",
        ProfileField::Birthdate => "Birthdate (YYYY-MM-DD)",
    }
}

pub fn availability(availability: Availability) -> String {
    match availability {
        Availability::Assigned(page) => page.to_string(),
        Availability::Unassigned => "Unassigned".into(),
    }
}

pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line of the user listing. Empty fields render as `-`.
pub fn user_row(user: &UserRecord) -> String {
    let address = [&user.street_address, &user.city, &user.state, &user.zip]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}  {}  {}  about: {}  address: {}  birthdate: {}  created {}",
        user.id,
        user.email,
        step_status(user.current_step),
        dash_if_empty(&user.about_me),
        dash_if_empty(&address),
        dash_if_empty(&user.birthdate),
        user.created_at.format("%Y-%m-%d %H:%M"),
    )
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn progress_marks_done_steps() {
        assert_eq!(
            progress(WizardStep::Step1),
            "[1] Account  [2] Profile  [3] Details"
        );
        assert_eq!(
            progress(WizardStep::Step3),
            "✓ Account  ✓ Profile  [3] Details"
        );
        assert_eq!(
            progress(WizardStep::Complete),
            "✓ Account  ✓ Profile  ✓ Details"
        );
    }

    #[test]
    fn step_labels() {
        assert_eq!(step_status(1), "Step 1 - Account Creation");
        assert_eq!(step_status(2), "Step 2 - Profile Info");
        assert_eq!(step_status(3), "Step 3 - Additional Info");
        assert_eq!(step_status(4), "Completed");
    }

    #[test]
    fn user_row_fills_blanks() {
        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::nil(),
            email: "a@b.com".into(),
            about_me: String::new(),
            street_address: "1 Main St".into(),
            city: "Austin".into(),
            state: String::new(),
            zip: String::new(),
            birthdate: String::new(),
            current_step: 2,
            created_at: now,
            updated_at: now,
        };

        let row = user_row(&user);
        assert!(row.contains("Step 2 - Profile Info"));
        assert!(row.contains("about: -"));
        assert!(row.contains("address: 1 Main St, Austin"));
    }
}
