// Client aggregate: customers an organization invoices

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::{
    optional_email, optional_phone, optional_siret, optional_text, optional_vat_number,
    optional_website, required_text, FieldErrors,
};
use crate::domain::shared::{LifecycleStatus, PageRequest, SortDirection};

pub const MAX_NOTES_LENGTH: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "client_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    Individual,
    Company,
}

/// Client aggregate
///
/// # Invariants
/// - Name is never empty
/// - Email and SIRET are unique among the organization's clients
/// - Individuals never carry a SIRET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub kind: ClientKind,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub status: LifecycleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(organization_id: Uuid, fields: ClientFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            kind: fields.kind,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            siret: fields.siret,
            vat_number: fields.vat_number,
            website: fields.website,
            notes: fields.notes,
            status: LifecycleStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: ClientFields) {
        self.kind = fields.kind;
        self.name = fields.name;
        self.email = fields.email;
        self.phone = fields.phone;
        self.siret = fields.siret;
        self.vat_number = fields.vat_number;
        self.website = fields.website;
        self.notes = fields.notes;
        self.updated_at = Utc::now();
    }

    /// Moves the client to another status; `Ok(false)` if it was already there
    pub fn change_status(&mut self, next: LifecycleStatus) -> Result<bool, String> {
        let changed = self.status.transition(next)?;
        if changed {
            self.updated_at = Utc::now();
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientInput {
    pub kind: Option<ClientKind>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientFields {
    pub kind: ClientKind,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl ClientInput {
    pub fn validate(self) -> Result<ClientFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let kind = self.kind.unwrap_or(ClientKind::Company);
        let name = required_text(&mut errors, "name", &self.name, 1, 150);
        let email = optional_email(&mut errors, "email", self.email.as_deref());
        let phone = optional_phone(&mut errors, "phone", self.phone.as_deref());
        let siret = optional_siret(&mut errors, "siret", self.siret.as_deref());
        if kind == ClientKind::Individual && siret.is_some() {
            errors.add("siret", "Un particulier ne peut pas avoir de SIRET");
        }
        let vat_number = optional_vat_number(&mut errors, "vat_number", self.vat_number.as_deref());
        let website = optional_website(&mut errors, "website", self.website.as_deref());
        let notes = optional_text(&mut errors, "notes", self.notes.as_deref(), MAX_NOTES_LENGTH);

        errors.into_result(ClientFields {
            kind,
            name,
            email,
            phone,
            siret,
            vat_number,
            website,
            notes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSort {
    #[default]
    Name,
    CreatedAt,
}

/// Listing filter, built from query-string parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub kind: Option<ClientKind>,
    pub sort: ClientSort,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl ClientFilter {
    /// Case-insensitive match on name or email
    pub fn matches(&self, client: &Client) -> bool {
        if self.status.is_some_and(|status| status != client.status) {
            return false;
        }
        if self.kind.is_some_and(|kind| kind != client.kind) {
            return false;
        }
        match &self.search {
            Some(search) => {
                let needle = search.to_lowercase();
                client.name.to_lowercase().contains(&needle)
                    || client
                        .email
                        .as_deref()
                        .is_some_and(|email| email.contains(&needle))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub kind: Option<ClientKind>,
    pub sort: Option<ClientSort>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ClientListQuery {
    pub fn validate(self) -> Result<ClientFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let search = optional_text(&mut errors, "search", self.search.as_deref(), 100);
        let page = PageRequest::parse(&mut errors, self.page, self.per_page);
        errors.into_result(ClientFilter {
            search,
            status: self.status,
            kind: self.kind,
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ClientInput {
        ClientInput {
            kind: Some(ClientKind::Company),
            name: "Librairie Dupont".to_string(),
            email: Some("compta@dupont.fr".to_string()),
            phone: None,
            siret: Some("44306184100047".to_string()),
            vat_number: None,
            website: None,
            notes: Some("Paiement à 30 jours".to_string()),
        }
    }

    fn client() -> Client {
        Client::new(Uuid::new_v4(), input().validate().unwrap())
    }

    #[test]
    fn valid_client_starts_active() {
        let client = client();
        assert_eq!(client.status, LifecycleStatus::Active);
        assert_eq!(client.name, "Librairie Dupont");
    }

    #[test]
    fn kind_defaults_to_company() {
        let fields = ClientInput {
            kind: None,
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.kind, ClientKind::Company);
    }

    #[test]
    fn individual_with_siret_rejected() {
        let errors = ClientInput {
            kind: Some(ClientKind::Individual),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("siret"));
    }

    #[test]
    fn notes_too_long_rejected() {
        let errors = ClientInput {
            notes: Some("x".repeat(MAX_NOTES_LENGTH + 1)),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("notes"));
    }

    #[test]
    fn status_change_archived_then_restored() {
        let mut client = client();
        assert_eq!(client.change_status(LifecycleStatus::Archived), Ok(true));
        assert!(client.change_status(LifecycleStatus::Inactive).is_err());
        assert_eq!(client.change_status(LifecycleStatus::Active), Ok(true));
    }

    #[test]
    fn filter_matches_search_case_insensitively() {
        let client = client();
        let filter = ClientFilter {
            search: Some("DUPONT".to_string()),
            ..ClientFilter::default()
        };
        assert!(filter.matches(&client));

        let filter = ClientFilter {
            search: Some("compta@".to_string()),
            ..ClientFilter::default()
        };
        assert!(filter.matches(&client));
    }

    #[test]
    fn filter_excludes_other_status() {
        let client = client();
        let filter = ClientFilter {
            status: Some(LifecycleStatus::Archived),
            ..ClientFilter::default()
        };
        assert!(!filter.matches(&client));
    }

    #[test]
    fn list_query_defaults() {
        let filter = ClientListQuery::default().validate().unwrap();
        assert_eq!(filter, ClientFilter::default());
    }
}
