// User accounts: the people behind sessions and memberships

pub mod value_objects;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::{required_text, FieldErrors};
use value_objects::Email;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// User data for persistence
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, never carrying the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            full_name: user.full_name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Registration form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Registration form once validated; the password is still plaintext
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub password: String,
    pub full_name: String,
}

impl RegistrationInput {
    pub fn validate(self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = Email::normalized(&self.email)
            .map_err(|_| errors.add("email", "Adresse e-mail invalide"))
            .ok();

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!(
                    "Le mot de passe doit contenir au moins {} caractères",
                    MIN_PASSWORD_LENGTH
                ),
            );
        }

        let full_name = required_text(&mut errors, "full_name", &self.full_name, 2, 100);

        match email {
            Some(email) if errors.is_empty() => Ok(Registration {
                email,
                password: self.password,
                full_name,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RegistrationInput {
        RegistrationInput {
            email: "Marie@Exemple.fr".to_string(),
            password: "motdepasse".to_string(),
            full_name: "Marie Curie".to_string(),
        }
    }

    #[test]
    fn valid_registration() {
        let registration = input().validate().expect("valid registration");
        assert_eq!(registration.email.as_str(), "marie@exemple.fr");
        assert_eq!(registration.full_name, "Marie Curie");
    }

    #[test]
    fn short_password_rejected() {
        let errors = RegistrationInput {
            password: "court".to_string(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("password"));
    }

    #[test]
    fn all_fields_reported_together() {
        let errors = RegistrationInput::default().validate().unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
        assert!(errors.contains("full_name"));
    }

    #[test]
    fn profile_hides_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: Email::new("a@b.fr").unwrap(),
            password_hash: "hash".to_string(),
            full_name: "A B".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.fr");
    }
}
