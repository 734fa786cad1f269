//! Render-ready description of the profile screen.
//!
//! Frontends (TUI, CLI) only draw what this module produces, so the choice
//! between the login control and the card lives in one place.

use crate::profile::UserProfile;

pub const LOGIN_LABEL: &str = "Google Login";
pub const LOGOUT_LABEL: &str = "Logout";
pub const CARD_HEADING: &str = "Profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileView {
    /// Only the login control is shown.
    SignedOut { login_label: &'static str },
    SignedIn(ProfileCard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub heading: &'static str,
    /// The profile's full name.
    pub title: String,
    /// Picture URL, shown as text.
    pub picture: String,
    pub fields: Vec<ProfileField>,
    pub logout_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileField {
    pub label: &'static str,
    pub value: String,
}

impl ProfileView {
    /// Picks the view for `profile`. A profile without a `name` counts as
    /// signed out.
    pub fn from_profile(profile: &UserProfile) -> Self {
        if profile.name.is_empty() {
            return Self::signed_out();
        }
        Self::SignedIn(ProfileCard::from_profile(profile))
    }

    pub fn signed_out() -> Self {
        Self::SignedOut {
            login_label: LOGIN_LABEL,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

impl ProfileCard {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let field = |label, value: &String| ProfileField {
            label,
            value: value.clone(),
        };
        Self {
            heading: CARD_HEADING,
            title: profile.name.clone(),
            picture: profile.picture.clone(),
            fields: vec![
                field("Given name", &profile.given_name),
                field("Family name", &profile.family_name),
                field("Email", &profile.email),
                field("Locale", &profile.locale),
            ],
            logout_label: LOGOUT_LABEL,
        }
    }

    /// Plain-text rendering used by the CLI.
    pub fn to_text(&self) -> String {
        let width = self
            .fields
            .iter()
            .map(|f| f.label.len())
            .max()
            .unwrap_or(0)
            .max("Picture".len());

        let mut out = format!("{}: {}\n", self.heading, self.title);
        for field in &self.fields {
            out.push_str(&format!("  {:<width$}  {}\n", field.label, field.value));
        }
        out.push_str(&format!("  {:<width$}  {}\n", "Picture", self.picture));
        out
    }
}
