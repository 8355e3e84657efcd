use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(
        length(min = 8, max = 128),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[validate(length(min = 1, max = 20))]
    pub employee_id: String,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

/// Upper and lower case letters, a digit, and a symbol (underscore counts).
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let missing = if !password.chars().any(|c| c.is_uppercase()) {
        Some("uppercase letter")
    } else if !password.chars().any(|c| c.is_lowercase()) {
        Some("lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("digit")
    } else if !password.chars().any(|c| !c.is_alphanumeric() || c == '_') {
        Some("special character")
    } else {
        None
    };

    match missing {
        Some(what) => {
            let mut err = ValidationError::new("password_strength");
            err.message = Some(format!("Password must contain at least one {}", what).into());
            Err(err)
        }
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub username: String,
    pub employee_id: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub role: String,
}
