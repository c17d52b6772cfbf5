use crate::models::profile::Role;
use rocket::serde::Deserialize;
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use zxcvbn::{Score, zxcvbn};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    #[validate(custom(function = "crate::models::user::validate_password_strength"))]
    pub password: String,
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    pub role: Role,
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
}

/// Profile attributes captured at sign-up.
#[derive(Debug, Clone)]
pub struct SignUpAttributes {
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
}

impl From<&SignUpRequest> for SignUpAttributes {
    fn from(request: &SignUpRequest) -> Self {
        Self {
            full_name: request.full_name.clone(),
            role: request.role,
            phone: request.phone.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let estimate = zxcvbn(password, &[]);
    if estimate.score() < Score::Three {
        let mut error = ValidationError::new("password_strength");
        error.message = Some("Password is too weak".into());
        return Err(error);
    }
    Ok(())
}
