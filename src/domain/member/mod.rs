// Organization membership and role-based permissions

pub mod role;

pub use role::{Permission, Role};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::FieldErrors;
use crate::domain::user::value_objects::Email;

/// Link between a user and an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.role.grants(permission)
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

/// Member listing row, joined with the user's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MemberWithUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Invitation form: an existing user's email and the role to grant
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemberInput {
    pub email: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub email: Email,
    pub role: Role,
}

impl MemberInput {
    pub fn validate(self) -> Result<NewMember, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = Email::normalized(&self.email)
            .map_err(|_| errors.add("email", "Adresse e-mail invalide"))
            .ok();
        if self.role.is_none() {
            errors.add("role", "Le rôle est requis");
        }
        match (email, self.role) {
            (Some(email), Some(role)) => Ok(NewMember { email, role }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleInput {
    pub role: Option<Role>,
}

impl RoleInput {
    pub fn validate(self) -> Result<Role, FieldErrors> {
        self.role
            .ok_or_else(|| FieldErrors::single("role", "Le rôle est requis"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_member_has_role_permissions() {
        let member = Member::new(Uuid::new_v4(), Uuid::new_v4(), Role::Editor);
        assert!(member.can(Permission::WriteData));
        assert!(!member.can(Permission::ManageMembers));
        assert!(!member.is_owner());
    }

    #[test]
    fn member_input_requires_role_and_email() {
        let errors = MemberInput::default().validate().unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("role"));
    }

    #[test]
    fn member_input_parses_role() {
        let input: MemberInput =
            serde_json::from_str(r#"{"email":"Paul@Exemple.fr","role":"admin"}"#).unwrap();
        let member = input.validate().unwrap();
        assert_eq!(member.role, Role::Admin);
        assert_eq!(member.email.as_str(), "paul@exemple.fr");
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        let parsed: Result<MemberInput, _> =
            serde_json::from_str(r#"{"email":"a@b.fr","role":"superuser"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn role_input_requires_role() {
        assert!(RoleInput::default().validate().is_err());
        assert_eq!(
            RoleInput { role: Some(Role::Viewer) }.validate(),
            Ok(Role::Viewer)
        );
    }
}
