// src/models/usermodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Helper,
    User,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Helper => "helper",
            UserRole::User => "user",
        }
    }

    /// Helpers and admins may list, view and close tickets.
    pub fn is_helper(&self) -> bool {
        matches!(self, UserRole::Helper | UserRole::Admin)
    }
}

/// Staff account as the ticket system sees it. Accounts are managed by the
/// auth subsystem; tickets only hold weak references to them and resolve
/// usernames for display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_and_admins_pass_the_helper_gate() {
        assert!(UserRole::Helper.is_helper());
        assert!(UserRole::Admin.is_helper());
        assert!(!UserRole::User.is_helper());
    }
}
