//! User records and authentication payloads.

use super::Extra;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

wire_enum! {
    /// Account role assigned by the server.
    Role {
        Student => "STUDENT",
        Faculty => "FACULTY",
        Admin => "ADMIN",
    }
}

/// User record as returned by the API and kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    /// "First Last", falling back to the username, then the email.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}

/// Response of signin, signup and OAuth registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Account registration form.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub role: Role,
}

impl SignupRequest {
    /// New student registration with whitespace trimmed and the email lowercased.
    pub fn student(
        username: &str,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password: password.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            role: Role::Student,
        }
    }
}

/// Password reset with the emailed one-time code.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}

/// Partial profile update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Third-party identity providers accepted by `/auth/oauth/register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
}

/// At least 8 characters with at least one letter and one digit.
fn validate_password(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if password.chars().count() >= 8 && has_letter && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password").with_message(
            "Password must be at least 8 characters with letters and numbers".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "username": "asha",
            "firstName": "Asha",
            "role": "STUDENT",
            "department": "Physics"
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.role, Some(Role::Student));
        assert_eq!(user.extra.get("department"), Some(&json!("Physics")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["department"], "Physics");
        assert_eq!(back["firstName"], "Asha");
    }

    #[test]
    fn test_unknown_role_survives_write_back() {
        let user: User = serde_json::from_value(json!({"id": 1, "role": "ALUMNI"})).unwrap();
        assert_eq!(user.role, Some(Role::Other("ALUMNI".to_string())));
        assert_eq!(user.role.as_ref().map(Role::as_str), Some("ALUMNI"));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["role"], "ALUMNI");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user: User = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(user.display_name(), "user 3");
        user.email = Some("a@b.edu".to_string());
        assert_eq!(user.display_name(), "a@b.edu");
        user.first_name = Some("Asha".to_string());
        assert_eq!(user.display_name(), "Asha");
    }

    #[test]
    fn test_signup_validation() {
        let ok = SignupRequest::student("asha", " Asha@Uni.EDU ", "secret123", "Asha", "Rao");
        assert_eq!(ok.email, "asha@uni.edu");
        assert!(ok.validate().is_ok());

        let weak = SignupRequest::student("asha", "asha@uni.edu", "password", "Asha", "Rao");
        assert!(weak.validate().is_err());

        let bad_email = SignupRequest::student("asha", "not-an-email", "secret123", "Asha", "Rao");
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_reset_password_otp_length() {
        let req = ResetPasswordRequest {
            email: "asha@uni.edu".to_string(),
            otp: "12345".to_string(),
            new_password: "secret123".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
