use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::user::RegisterRequest;

/// Field-keyed validation messages, collected as data rather than
/// raised one at a time. Empty means the input passed.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

pub const MSG_PASSWORD_TOO_SHORT: &str = "password must be at least 8 characters";
pub const MSG_PASSWORD_NO_UPPERCASE: &str = "password must contain an uppercase letter";
pub const MSG_PASSWORD_NO_DIGIT: &str = "password must contain a digit";
pub const MSG_PASSWORD_NO_SPECIAL: &str = "password must contain a special character";
pub const MSG_EMAIL_INVALID: &str = "email address is not valid";
pub const MSG_FIELD_REQUIRED: &str = "must not be empty";

/// Validates a registration request, reporting every violated rule at
/// once rather than stopping at the first.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.name.trim().is_empty() {
        errors.push("name", MSG_FIELD_REQUIRED);
    }
    if req.surname.trim().is_empty() {
        errors.push("surname", MSG_FIELD_REQUIRED);
    }
    if !is_well_formed_email(&req.email) {
        errors.push("email", MSG_EMAIL_INVALID);
    }
    for message in password_violations(&req.password) {
        errors.push("password", message);
    }

    errors.into_result()
}

/// Each complexity rule is checked independently so every failing rule
/// gets its own message.
pub fn password_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();
    if password.chars().count() < 8 {
        violations.push(MSG_PASSWORD_TOO_SHORT);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push(MSG_PASSWORD_NO_UPPERCASE);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(MSG_PASSWORD_NO_DIGIT);
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        violations.push(MSG_PASSWORD_NO_SPECIAL);
    }
    violations
}

fn is_well_formed_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Anna".to_string(),
            surname: "Petrova".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&request("a@b.com", "Abcdef1!")).is_ok());
    }

    #[test]
    fn test_password_too_short_rejected() {
        let violations = password_violations("Abcde1!");
        assert_eq!(violations, vec![MSG_PASSWORD_TOO_SHORT]);
    }

    #[test]
    fn test_password_without_uppercase_rejected() {
        let violations = password_violations("abcdefg1!");
        assert_eq!(violations, vec![MSG_PASSWORD_NO_UPPERCASE]);
    }

    #[test]
    fn test_password_without_digit_rejected() {
        let violations = password_violations("Abcdefgh!");
        assert_eq!(violations, vec![MSG_PASSWORD_NO_DIGIT]);
    }

    #[test]
    fn test_password_without_special_rejected() {
        let violations = password_violations("Abcdefg1");
        assert_eq!(violations, vec![MSG_PASSWORD_NO_SPECIAL]);
    }

    #[test]
    fn test_all_password_rules_reported_together() {
        let violations = password_violations("abc");
        assert_eq!(
            violations,
            vec![
                MSG_PASSWORD_TOO_SHORT,
                MSG_PASSWORD_NO_UPPERCASE,
                MSG_PASSWORD_NO_DIGIT,
                MSG_PASSWORD_NO_SPECIAL,
            ]
        );
    }

    #[test]
    fn test_malformed_email_rejected() {
        for email in ["", "no-at-sign", "@b.com", "a@", "a@nodot", "a b@c.com", "a@b@c.com"] {
            let result = validate_registration(&request(email, "Abcdef1!"));
            let errors = result.unwrap_err();
            assert_eq!(
                errors.fields.get("email"),
                Some(&vec![MSG_EMAIL_INVALID.to_string()]),
                "expected email error for {:?}",
                email
            );
        }
    }

    #[test]
    fn test_empty_name_and_surname_rejected() {
        let req = RegisterRequest {
            name: "  ".to_string(),
            surname: "".to_string(),
            email: "a@b.com".to_string(),
            password: "Abcdef1!".to_string(),
        };
        let errors = validate_registration(&req).unwrap_err();
        assert!(errors.fields.contains_key("name"));
        assert!(errors.fields.contains_key("surname"));
    }

    #[test]
    fn test_errors_collected_across_fields() {
        let errors = validate_registration(&request("bad-email", "short")).unwrap_err();
        assert!(errors.fields.contains_key("email"));
        assert!(errors.fields.contains_key("password"));
        assert!(errors.fields["password"].len() > 1);
    }
}
