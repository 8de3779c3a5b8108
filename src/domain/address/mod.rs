// Postal addresses attached to a client or a supplier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::shared::validation::{optional_text, required_text, FieldErrors};
use crate::domain::shared::value_objects::CountryCode;

/// The business partner owning an address or a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum PartyRef {
    Client(Uuid),
    Supplier(Uuid),
}

impl PartyRef {
    pub fn id(&self) -> Uuid {
        match self {
            PartyRef::Client(id) | PartyRef::Supplier(id) => *id,
        }
    }

    /// Splits into the `(client_id, supplier_id)` column pair
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            PartyRef::Client(id) => (Some(*id), None),
            PartyRef::Supplier(id) => (None, Some(*id)),
        }
    }

    /// Rebuilds the owner from the column pair; exactly one must be set
    pub fn from_columns(client_id: Option<Uuid>, supplier_id: Option<Uuid>) -> Option<Self> {
        match (client_id, supplier_id) {
            (Some(id), None) => Some(PartyRef::Client(id)),
            (None, Some(id)) => Some(PartyRef::Supplier(id)),
            _ => None,
        }
    }
}

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyRef::Client(id) => write!(f, "client:{}", id),
            PartyRef::Supplier(id) => write!(f, "supplier:{}", id),
        }
    }
}

/// Address entity
///
/// # Invariants
/// - An owner with at least one address has exactly one default address
/// - French postal codes are exactly 5 digits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub owner: PartyRef,
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Address {
    pub fn new(owner: PartyRef, fields: AddressFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            label: fields.label,
            line1: fields.line1,
            line2: fields.line2,
            postal_code: fields.postal_code,
            city: fields.city,
            country: fields.country,
            is_default: fields.is_default,
            created_at: Utc::now(),
        }
    }

    /// Applies an edit; a default address stays default even if the form unsets it
    pub fn apply(&mut self, fields: AddressFields) {
        self.label = fields.label;
        self.line1 = fields.line1;
        self.line2 = fields.line2;
        self.postal_code = fields.postal_code;
        self.city = fields.city;
        self.country = fields.country;
        self.is_default = self.is_default || fields.is_default;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressInput {
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressFields {
    pub label: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub is_default: bool,
}

impl AddressInput {
    pub fn validate(self) -> Result<AddressFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let label = optional_text(&mut errors, "label", self.label.as_deref(), 60);
        let line1 = required_text(&mut errors, "line1", &self.line1, 1, 200);
        let line2 = optional_text(&mut errors, "line2", self.line2.as_deref(), 200);
        let city = required_text(&mut errors, "city", &self.city, 1, 100);

        let country = match self.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => CountryCode::new(code)
                .map_err(|message| errors.add("country", message))
                .ok(),
            None => Some(CountryCode::france()),
        };

        let postal_code = required_text(&mut errors, "postal_code", &self.postal_code, 1, 12);
        if let Some(country) = &country {
            let french_format =
                postal_code.len() == 5 && postal_code.chars().all(|c| c.is_ascii_digit());
            if country.is_france() && !postal_code.is_empty() && !french_format {
                errors.add("postal_code", "Le code postal doit contenir 5 chiffres");
            }
        }

        let country = country.map(|c| c.as_str().to_string()).unwrap_or_default();
        errors.into_result(AddressFields {
            label,
            line1,
            line2,
            postal_code,
            city,
            country,
            is_default: self.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            label: Some("Siège".to_string()),
            line1: "12 rue de la Paix".to_string(),
            line2: None,
            postal_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: None,
            is_default: false,
        }
    }

    #[test]
    fn country_defaults_to_france() {
        let fields = input().validate().unwrap();
        assert_eq!(fields.country, "FR");
    }

    #[test]
    fn french_postal_code_must_be_five_digits() {
        let errors = AddressInput {
            postal_code: "7500".to_string(),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("postal_code"));
    }

    #[test]
    fn foreign_postal_code_is_free_form() {
        let fields = AddressInput {
            postal_code: "SW1A 1AA".to_string(),
            country: Some("gb".to_string()),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.country, "GB");
    }

    #[test]
    fn required_fields_reported() {
        let errors = AddressInput::default().validate().unwrap_err();
        assert!(errors.contains("line1"));
        assert!(errors.contains("city"));
        assert!(errors.contains("postal_code"));
    }

    #[test]
    fn invalid_country_reported() {
        let errors = AddressInput {
            country: Some("France".to_string()),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("country"));
    }

    #[test]
    fn default_is_sticky_on_apply() {
        let owner = PartyRef::Client(Uuid::new_v4());
        let mut address = Address::new(
            owner,
            AddressFields {
                is_default: true,
                ..input().validate().unwrap()
            },
        );
        address.apply(input().validate().unwrap());
        assert!(address.is_default);
    }

    #[test]
    fn party_ref_columns_round_trip() {
        let id = Uuid::new_v4();
        let owner = PartyRef::Supplier(id);
        let (client_id, supplier_id) = owner.columns();
        assert_eq!(PartyRef::from_columns(client_id, supplier_id), Some(owner));
        assert_eq!(PartyRef::from_columns(Some(id), Some(id)), None);
        assert_eq!(PartyRef::from_columns(None, None), None);
    }

    #[test]
    fn party_ref_serializes_tagged() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(PartyRef::Client(id)).unwrap();
        assert_eq!(json["type"], "client");
        assert_eq!(json["id"], id.to_string());
    }
}
