use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_db(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub approved: bool,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Students and admins are never gated on approval.
    pub fn is_effectively_approved(&self) -> bool {
        match self.role {
            Role::Teacher => self.approved,
            Role::Student | Role::Admin => true,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub role: String,
    pub approved: bool,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = String;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = Role::from_db(&row.role).ok_or_else(|| format!("unknown role '{}' on profile {}", row.role, row.id))?;
        Ok(Profile {
            id: row.id,
            role,
            approved: row.approved,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub role: Role,
    pub approved: bool,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            approved: profile.approved,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 2, max = 120))]
    pub full_name: String,
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct ApprovalUpdateRequest {
    pub approved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            role: role.to_string(),
            approved: false,
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn known_roles_convert() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            let profile = Profile::try_from(row(role.as_db())).unwrap();
            assert_eq!(profile.role, role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Profile::try_from(row("parent")).is_err());
    }

    #[test]
    fn only_teachers_are_gated_on_approval() {
        let student = Profile::try_from(row("student")).unwrap();
        let teacher = Profile::try_from(row("teacher")).unwrap();
        assert!(student.is_effectively_approved());
        assert!(!teacher.is_effectively_approved());
    }
}
