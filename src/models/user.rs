// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::badge::BadgeProgress;

/// Account roles, totally ordered: LEARNER < INSTRUCTOR < ADMIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Learner,
    Instructor,
    Admin,
}

impl Role {
    pub fn level(self) -> u8 {
        match self {
            Role::Learner => 1,
            Role::Instructor => 2,
            Role::Admin => 3,
        }
    }

    /// True when `self` sits at or above `min` in the hierarchy.
    pub fn has_min_role(self, min: Role) -> bool {
        self.level() >= min.level()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Learner => "LEARNER",
            Role::Instructor => "INSTRUCTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LEARNER" => Ok(Role::Learner),
            "INSTRUCTOR" => Ok(Role::Instructor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Stored as 'LEARNER', 'INSTRUCTOR' or 'ADMIN'.
    pub role: String,

    pub total_points: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub const USER_COLUMNS: &str = "id, name, email, password, role, total_points, created_at";

/// Public view of a user, safe to return from any endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub total_points: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            total_points: u.total_points,
            created_at: u.created_at,
        }
    }
}

/// Aggregated profile for the current user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub enrolled_courses: i64,
    pub completed_lessons: i64,
    pub badge: BadgeProgress,
}

/// Row for the public leaderboard.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub total_points: i32,
    #[sqlx(skip)]
    pub badge: Option<String>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 2,
        max = 80,
        message = "Name length must be between 2 and 80 characters."
    ))]
    pub name: String,
    #[validate(email(message = "Email address is invalid."), length(max = 254))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: UserResponse,
}

/// DTO for an admin changing someone's role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Admin.has_min_role(Role::Instructor));
        assert!(Role::Admin.has_min_role(Role::Admin));
        assert!(Role::Instructor.has_min_role(Role::Learner));
        assert!(!Role::Instructor.has_min_role(Role::Admin));
        assert!(!Role::Learner.has_min_role(Role::Instructor));
        assert!(Role::Learner.has_min_role(Role::Learner));
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("instructor".parse::<Role>(), Ok(Role::Instructor));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_uppercase() {
        let json = serde_json::to_string(&Role::Learner).unwrap();
        assert_eq!(json, "\"LEARNER\"");
        let parsed: UpdateRoleRequest = serde_json::from_str(r#"{"role":"INSTRUCTOR"}"#).unwrap();
        assert_eq!(parsed.role, Role::Instructor);
    }

    #[test]
    fn test_register_validation() {
        let bad = CreateUserRequest {
            name: "A".into(),
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));

        let good = CreateUserRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret123".into(),
        };
        assert!(good.validate().is_ok());
    }
}
