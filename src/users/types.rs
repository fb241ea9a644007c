use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::ValidateEmail;

const USERNAME_MIN: usize = 6;
const USERNAME_MAX: usize = 30;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Response structure for the login endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Field-level validation messages keyed by field name; empty when valid
    pub fn validate(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        let username_errors = if self.username.is_empty() {
            vec!["Required".to_string()]
        } else {
            validate_username(&self.username)
        };
        if !username_errors.is_empty() {
            errors.insert("username".to_string(), username_errors.join(", "));
        }

        if self.email.is_empty() {
            errors.insert("email".to_string(), "Required".to_string());
        } else if !self.email.validate_email() {
            errors.insert("email".to_string(), "Invalid email address".to_string());
        }

        if self.password.is_empty() {
            errors.insert("password".to_string(), "Required".to_string());
        } else if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&self.password.len()) {
            errors.insert(
                "password".to_string(),
                format!(
                    "Must be between {} and {} characters long",
                    PASSWORD_MIN, PASSWORD_MAX
                ),
            );
        }

        errors
    }
}

fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let mut length = 0;

    for (index, ch) in username.chars().enumerate() {
        length += 1;
        if ch.is_numeric() {
            if index == 0 {
                errors.push("Cannot start with a number".to_string());
            }
        } else if ch == '_' {
            if index == 0 {
                errors.push("Cannot start with an underscore".to_string());
            }
        } else if !(ch.is_uppercase() || ch.is_lowercase()) {
            errors.push("Only alphanumeric characters and underscores (_) allowed".to_string());
        }
    }

    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        errors.push(format!(
            "Must be between {} and {} characters long",
            USERNAME_MIN, USERNAME_MAX
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        let errors = request("chef_anna", "anna@example.com", "password1").validate();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_all_fields_required() {
        let errors = request("", "", "").validate();
        assert_eq!(errors.get("username").map(String::as_str), Some("Required"));
        assert_eq!(errors.get("email").map(String::as_str), Some("Required"));
        assert_eq!(errors.get("password").map(String::as_str), Some("Required"));
    }

    #[rstest]
    #[case("1chef_anna", "Cannot start with a number")]
    #[case("_chef_anna", "Cannot start with an underscore")]
    #[case("chef-anna", "Only alphanumeric characters and underscores (_) allowed")]
    #[case("anna", "Must be between 6 and 30 characters long")]
    #[case(
        "a_very_long_username_that_goes_on",
        "Must be between 6 and 30 characters long"
    )]
    #[case(
        "1ab",
        "Cannot start with a number, Must be between 6 and 30 characters long"
    )]
    fn test_invalid_usernames(#[case] username: &str, #[case] expected: &str) {
        let errors = request(username, "anna@example.com", "password1").validate();
        assert_eq!(errors.get("username").map(String::as_str), Some(expected));
        assert_eq!(errors.len(), 1);
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("anna@")]
    #[case("@example.com")]
    fn test_invalid_emails(#[case] email: &str) {
        let errors = request("chef_anna", email, "password1").validate();
        assert_eq!(
            errors.get("email").map(String::as_str),
            Some("Invalid email address")
        );
    }

    #[rstest]
    #[case("short")]
    #[case("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx")]
    fn test_invalid_passwords(#[case] password: &str) {
        let errors = request("chef_anna", "anna@example.com", password).validate();
        assert_eq!(
            errors.get("password").map(String::as_str),
            Some("Must be between 6 and 64 characters long")
        );
    }

    #[test]
    fn test_login_response_serialization() {
        let response = LoginResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "access");
        assert_eq!(json["refresh_token"], "refresh");
    }
}
