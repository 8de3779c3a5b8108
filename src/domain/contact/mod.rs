// People to reach at a client or supplier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::address::PartyRef;
use crate::domain::shared::validation::{
    optional_email, optional_phone, optional_text, required_text, FieldErrors,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner: PartyRef,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(owner: PartyRef, fields: ContactFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            job_title: fields.job_title,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, fields: ContactFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.email = fields.email;
        self.phone = fields.phone;
        self.job_title = fields.job_title;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
}

impl ContactInput {
    pub fn validate(self) -> Result<ContactFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = ContactFields {
            first_name: required_text(&mut errors, "first_name", &self.first_name, 1, 80),
            last_name: required_text(&mut errors, "last_name", &self.last_name, 1, 80),
            email: optional_email(&mut errors, "email", self.email.as_deref()),
            phone: optional_phone(&mut errors, "phone", self.phone.as_deref()),
            job_title: optional_text(&mut errors, "job_title", self.job_title.as_deref(), 100),
        };
        errors.into_result(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_contact() {
        let fields = ContactInput {
            first_name: " Claire ".to_string(),
            last_name: "Moreau".to_string(),
            job_title: Some("Comptable".to_string()),
            ..ContactInput::default()
        }
        .validate()
        .unwrap();
        let contact = Contact::new(PartyRef::Client(Uuid::new_v4()), fields);
        assert_eq!(contact.full_name(), "Claire Moreau");
    }

    #[test]
    fn names_required() {
        let errors = ContactInput::default().validate().unwrap_err();
        assert!(errors.contains("first_name"));
        assert!(errors.contains("last_name"));
    }

    #[test]
    fn invalid_email_rejected() {
        let errors = ContactInput {
            first_name: "Claire".to_string(),
            last_name: "Moreau".to_string(),
            email: Some("claire".to_string()),
            ..ContactInput::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("email"));
    }
}
