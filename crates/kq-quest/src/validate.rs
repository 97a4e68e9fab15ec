//! Result form validation.
//!
//! A bad submission is never partly processed: it becomes a [`Rejection`],
//! which the frontend turns into a redirect back to the scene page.

use std::fmt;

use kq_core::{ChoiceKey, Opi};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::is_valid_session_id;

/// The raw fields posted by the scene page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultForm {
    /// Choice key, e.g. `stay_tea`.
    pub choice: Option<String>,
    /// The OPI the scene was generated for.
    pub opi: Option<String>,
    /// Anti-forgery token.
    pub csrf_token: Option<String>,
    /// Session id.
    pub session_id: Option<String>,
}

impl ResultForm {
    /// Fill every field.
    pub fn new(
        choice: impl Into<String>,
        opi: impl Into<String>,
        csrf_token: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            choice: Some(choice.into()),
            opi: Some(opi.into()),
            csrf_token: Some(csrf_token.into()),
            session_id: Some(session_id.into()),
        }
    }
}

/// Why a submission was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Missing, stale or mismatched anti-forgery token.
    #[error("CSRF token verification failed")]
    Csrf,
    /// Choice missing or not of the form `(stay|out)_[a-z]+`.
    #[error("invalid choice")]
    InvalidChoice,
    /// OPI missing or not an integer in 0..=100.
    #[error("invalid OPI")]
    InvalidOpi,
    /// Session id missing or malformed.
    #[error("invalid session")]
    InvalidSession,
}

impl Rejection {
    /// Error code used in the redirect.
    pub fn code(self) -> &'static str {
        match self {
            Self::Csrf => "csrf",
            Self::InvalidChoice => "invalid_choice",
            Self::InvalidOpi => "invalid_opi",
            Self::InvalidSession => "invalid_session",
        }
    }

    /// Where the client is sent back to.
    pub fn location(self) -> String {
        format!("/?error={}", self.code())
    }
}

/// A redirect target, for display.
pub struct Redirect(pub Rejection);

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "303 See Other -> {}", self.0.location())
    }
}

/// Fields that passed validation. The anti-forgery token is checked
/// separately against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    /// Parsed choice.
    pub choice: ChoiceKey,
    /// Parsed OPI.
    pub opi: Opi,
    /// Session id.
    pub session_id: String,
}

/// Check the session id format.
pub fn validate_session_id(id: Option<&str>) -> Result<&str, Rejection> {
    id.filter(|id| is_valid_session_id(id))
        .ok_or(Rejection::InvalidSession)
}

/// Parse a choice key.
pub fn validate_choice(choice: Option<&str>) -> Result<ChoiceKey, Rejection> {
    choice
        .and_then(|c| ChoiceKey::parse(c).ok())
        .ok_or(Rejection::InvalidChoice)
}

/// Parse a strict 0..=100 integer OPI.
pub fn validate_opi(opi: Option<&str>) -> Result<Opi, Rejection> {
    opi.and_then(|o| Opi::parse(o).ok())
        .ok_or(Rejection::InvalidOpi)
}

/// Validate session id, then choice, then OPI. The first failure wins.
pub fn validate_fields(form: &ResultForm) -> Result<ValidForm, Rejection> {
    let session_id = validate_session_id(form.session_id.as_deref())?.to_string();
    let choice = validate_choice(form.choice.as_deref())?;
    let opi = validate_opi(form.opi.as_deref())?;
    Ok(ValidForm {
        choice,
        opi,
        session_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0123456789abcdef";

    #[test]
    fn codes_and_locations() {
        assert_eq!(Rejection::Csrf.location(), "/?error=csrf");
        assert_eq!(Rejection::InvalidChoice.location(), "/?error=invalid_choice");
        assert_eq!(Rejection::InvalidOpi.location(), "/?error=invalid_opi");
        assert_eq!(Rejection::InvalidSession.code(), "invalid_session");
        assert_eq!(
            Redirect(Rejection::Csrf).to_string(),
            "303 See Other -> /?error=csrf"
        );
    }

    #[test]
    fn choice_rules() {
        assert!(validate_choice(Some("stay_tea")).is_ok());
        assert!(validate_choice(Some("out_anything")).is_ok());
        for bad in ["", "stay_", "stay_Tea", "go_tea", "stay_tea1", "stay_te a"] {
            assert_eq!(validate_choice(Some(bad)), Err(Rejection::InvalidChoice), "{bad}");
        }
        assert_eq!(validate_choice(None), Err(Rejection::InvalidChoice));
    }

    #[test]
    fn opi_rules() {
        assert_eq!(validate_opi(Some("0")).map(Opi::value), Ok(0));
        assert_eq!(validate_opi(Some("100")).map(Opi::value), Ok(100));
        for bad in ["101", "-1", "abc", "", "50.5"] {
            assert_eq!(validate_opi(Some(bad)), Err(Rejection::InvalidOpi), "{bad}");
        }
    }

    #[test]
    fn field_priority() {
        let form = ResultForm::new("nope", "999", "t", "short");
        assert_eq!(validate_fields(&form), Err(Rejection::InvalidSession));
        let form = ResultForm::new("nope", "999", "t", ID);
        assert_eq!(validate_fields(&form), Err(Rejection::InvalidChoice));
        let form = ResultForm::new("stay_tea", "999", "t", ID);
        assert_eq!(validate_fields(&form), Err(Rejection::InvalidOpi));
        let ok = validate_fields(&ResultForm::new("stay_tea", "42", "t", ID)).unwrap();
        assert_eq!(ok.choice.to_string(), "stay_tea");
        assert_eq!(ok.opi.value(), 42);
    }
}
