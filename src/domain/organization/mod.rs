// Organization: the tenant owning clients, suppliers, products and members

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::member::Role;
use crate::domain::shared::validation::{
    optional_email, optional_phone, optional_siret, optional_text, optional_vat_number,
    optional_website, required_text, FieldErrors,
};

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Organization aggregate
///
/// # Invariants
/// - Name is 2 to 100 characters
/// - SIRET, when present, is unique across organizations
/// - Currency is a 3-letter uppercase code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub legal_form: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub currency: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(fields: OrganizationFields, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: fields.name,
            legal_form: fields.legal_form,
            siret: fields.siret,
            vat_number: fields.vat_number,
            email: fields.email,
            phone: fields.phone,
            website: fields.website,
            currency: fields.currency,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: OrganizationFields) {
        self.name = fields.name;
        self.legal_form = fields.legal_form;
        self.siret = fields.siret;
        self.vat_number = fields.vat_number;
        self.email = fields.email;
        self.phone = fields.phone;
        self.website = fields.website;
        self.currency = fields.currency;
        self.updated_at = Utc::now();
    }
}

/// An organization seen from one of its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    #[serde(flatten)]
    pub organization: Organization,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganizationInput {
    pub name: String,
    pub legal_form: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationFields {
    pub name: String,
    pub legal_form: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub currency: String,
}

impl OrganizationInput {
    pub fn validate(self) -> Result<OrganizationFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, 2, 100);
        let legal_form = optional_text(&mut errors, "legal_form", self.legal_form.as_deref(), 50);
        let siret = optional_siret(&mut errors, "siret", self.siret.as_deref());
        let vat_number = optional_vat_number(&mut errors, "vat_number", self.vat_number.as_deref());
        let email = optional_email(&mut errors, "email", self.email.as_deref());
        let phone = optional_phone(&mut errors, "phone", self.phone.as_deref());
        let website = optional_website(&mut errors, "website", self.website.as_deref());

        let currency = self
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            errors.add("currency", "Code devise invalide (ISO 4217, 3 lettres)");
        }

        errors.into_result(OrganizationFields {
            name,
            legal_form,
            siret,
            vat_number,
            email,
            phone,
            website,
            currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> OrganizationInput {
        OrganizationInput {
            name: "Boulangerie Martin".to_string(),
            legal_form: Some("SARL".to_string()),
            siret: Some("732 829 320 00074".to_string()),
            vat_number: Some("FR44732829320".to_string()),
            email: Some("Contact@Martin.fr".to_string()),
            phone: Some("01 23 45 67 89".to_string()),
            website: Some("https://martin.fr".to_string()),
            currency: None,
        }
    }

    #[test]
    fn valid_organization_defaults_currency() {
        let fields = input().validate().expect("valid organization");
        assert_eq!(fields.currency, "EUR");
        assert_eq!(fields.siret.as_deref(), Some("73282932000074"));
        assert_eq!(fields.email.as_deref(), Some("contact@martin.fr"));
    }

    #[test]
    fn name_required() {
        let errors = OrganizationInput {
            name: " ".to_string(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn invalid_identifiers_reported() {
        let errors = OrganizationInput {
            siret: Some("123".to_string()),
            vat_number: Some("XX1".to_string()),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("siret"));
        assert!(errors.contains("vat_number"));
    }

    #[test]
    fn invalid_currency() {
        let errors = OrganizationInput {
            currency: Some("euro".to_string()),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("currency"));
    }

    #[test]
    fn apply_updates_fields() {
        let creator = Uuid::new_v4();
        let mut organization = Organization::new(input().validate().unwrap(), creator);
        let created_at = organization.created_at;

        organization.apply(
            OrganizationInput {
                name: "Martin & Fils".to_string(),
                ..OrganizationInput::default()
            }
            .validate()
            .unwrap(),
        );

        assert_eq!(organization.name, "Martin & Fils");
        assert_eq!(organization.siret, None);
        assert_eq!(organization.created_by, creator);
        assert_eq!(organization.created_at, created_at);
    }

    #[test]
    fn membership_serializes_flat() {
        let organization = Organization::new(input().validate().unwrap(), Uuid::new_v4());
        let membership = OrganizationMembership {
            organization,
            role: Role::Owner,
        };
        let json = serde_json::to_value(&membership).unwrap();
        assert_eq!(json["name"], "Boulangerie Martin");
        assert_eq!(json["role"], "owner");
    }
}
