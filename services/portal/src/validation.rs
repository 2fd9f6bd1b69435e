//! Input validation for the login and registration forms
//!
//! These checks only catch obvious mistakes before a request is sent; the
//! backend remains the authority and its messages are shown as-is.

use chrono::{Datelike, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::RegistrationRequest;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() > 150 {
        return Err("Username must be at most 150 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, and @/./+/-/_ characters".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a new password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    Ok(())
}

/// Validate the 6-digit student number
pub fn validate_student_id(student_id: &str) -> Result<(), String> {
    if student_id.len() != 6 || !student_id.chars().all(|c| c.is_ascii_digit()) {
        return Err("Student ID must be exactly 6 digits".to_string());
    }
    Ok(())
}

/// Validate a graduation year against the current calendar
pub fn validate_graduation_year(year: i32) -> Result<(), String> {
    let latest = Utc::now().year() + 1;
    if !(1900..=latest).contains(&year) {
        return Err(format!("Graduation year must be between 1900 and {}", latest));
    }
    Ok(())
}

/// Validate the login form
pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

/// Validate the registration form
pub fn validate_registration(fields: &RegistrationRequest) -> Result<(), String> {
    validate_username(&fields.username)?;
    validate_email(&fields.email)?;
    validate_password(&fields.password)?;

    if fields.password != fields.password_confirm {
        return Err("Passwords do not match".to_string());
    }

    if let Some(student_id) = fields.student_id.as_deref() {
        validate_student_id(student_id)?;
    }

    if let Some(year) = fields.graduation_year {
        validate_graduation_year(year)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationRequest {
        RegistrationRequest {
            username: "jane_doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
            student_id: Some("123456".to_string()),
            graduation_year: Some(2020),
            ..RegistrationRequest::default()
        }
    }

    #[test]
    fn test_valid_registration() {
        assert_eq!(validate_registration(&registration()), Ok(()));
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut fields = registration();
        fields.password_confirm = "something else".to_string();
        assert_eq!(
            validate_registration(&fields),
            Err("Passwords do not match".to_string())
        );
    }

    #[test]
    fn test_student_id_is_six_digits() {
        assert!(validate_student_id("123456").is_ok());
        assert!(validate_student_id("12345").is_err());
        assert!(validate_student_id("1234567").is_err());
        assert!(validate_student_id("12a456").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("longenough1").is_ok());
    }

    #[test]
    fn test_email_and_username() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username("jane.doe+alumni@x").is_ok());
    }

    #[test]
    fn test_graduation_year_bounds() {
        assert!(validate_graduation_year(1899).is_err());
        assert!(validate_graduation_year(2015).is_ok());
        assert!(validate_graduation_year(Utc::now().year() + 5).is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert!(validate_login("", "pw").is_err());
        assert!(validate_login("abc", "").is_err());
        assert!(validate_login("abc", "pw").is_ok());
    }
}
