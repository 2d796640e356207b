//! Client-side form validation
//!
//! These checks mirror what the backend enforces so obviously bad input is
//! rejected before a request is sent.

use fancy_regex::Regex;
use once_cell::sync::Lazy;

use crate::api::Profile;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// At least six characters with one uppercase and one lowercase letter
static BASIC_PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?=.*[A-Z])(?=.*[a-z]).{6,}$").expect("password pattern is valid"));

/// Basic rules plus a digit and a symbol; used for password resets
static STRONG_PASSWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?=.*[a-z])(?=.*[A-Z])(?=.*\d)(?=.*[\W_]).{6,}$")
        .expect("strong password pattern is valid")
});

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6,15}$").expect("phone pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Username or email is required")]
    MissingIdentifier,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Password must be at least 6 characters and include at least 1 uppercase and 1 lowercase letter")]
    WeakPassword,

    #[error("Password must be at least 6 characters and include an uppercase letter, a lowercase letter, a number and a symbol")]
    WeakResetPassword,

    #[error("New password and confirm password do not match!")]
    PasswordMismatch,

    #[error("Phone is required")]
    MissingPhone,

    #[error("Phone number must be 6 to 15 digits")]
    InvalidPhone,

    #[error("Name is required")]
    MissingName,

    #[error("Email is required")]
    MissingEmail,

    #[error("Email must be a valid @gmail.com address")]
    InvalidProfileEmail,

    #[error("Username is required")]
    MissingUsername,
}

fn matches(pattern: &Regex, input: &str) -> bool {
    // Patterns are anchored and backtrack-bounded; an engine error means no match.
    pattern.is_match(input).unwrap_or(false)
}

/// Login identifier: a username, or an email when it contains `@`
pub fn validate_identifier(raw: &str) -> Result<(), ValidationError> {
    let identifier = raw.trim();
    if identifier.is_empty() {
        return Err(ValidationError::MissingIdentifier);
    }
    if identifier.contains('@') && !matches(&EMAIL, identifier) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Password accepted by the login and profile forms
pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
    let password = raw.trim();
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    if !matches(&BASIC_PASSWORD, password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// New password for the forgot-password flow
pub fn validate_reset_password(password: &str) -> Result<(), ValidationError> {
    if matches(&STRONG_PASSWORD, password) {
        Ok(())
    } else {
        Err(ValidationError::WeakResetPassword)
    }
}

/// New password plus confirmation for the profile's change-password form
pub fn validate_password_change(new_password: &str, confirm: &str) -> Result<(), ValidationError> {
    if !matches(&BASIC_PASSWORD, new_password) {
        return Err(ValidationError::WeakPassword);
    }
    if new_password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// National number without country code
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Err(ValidationError::MissingPhone);
    }
    if matches(&PHONE, phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Profile edit form; `phone` holds the national number being edited.
///
/// Fields are checked in form order and the first failure is returned.
pub fn validate_profile(profile: &Profile) -> Result<(), ValidationError> {
    if profile.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    let email = profile.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !email.ends_with("@gmail.com") {
        return Err(ValidationError::InvalidProfileEmail);
    }
    validate_phone(&profile.phone)?;
    if profile.username.trim().is_empty() {
        return Err(ValidationError::MissingUsername);
    }
    Ok(())
}
