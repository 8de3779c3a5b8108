// Supplier aggregate: vendors an organization buys from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::client::MAX_NOTES_LENGTH;
use crate::domain::shared::validation::{
    optional_email, optional_phone, optional_siret, optional_text, optional_vat_number,
    optional_website, required_text, FieldErrors,
};
use crate::domain::shared::{LifecycleStatus, PageRequest, SortDirection};

/// Supplier aggregate
///
/// Email and SIRET are unique among the organization's suppliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub organization_id: Uuid,
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

impl Supplier {
    pub fn new(organization_id: Uuid, fields: SupplierFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
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

    pub fn apply(&mut self, fields: SupplierFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.phone = fields.phone;
        self.siret = fields.siret;
        self.vat_number = fields.vat_number;
        self.website = fields.website;
        self.notes = fields.notes;
        self.updated_at = Utc::now();
    }

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
pub struct SupplierInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<String>,
    pub vat_number: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl SupplierInput {
    pub fn validate(self) -> Result<SupplierFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = SupplierFields {
            name: required_text(&mut errors, "name", &self.name, 1, 150),
            email: optional_email(&mut errors, "email", self.email.as_deref()),
            phone: optional_phone(&mut errors, "phone", self.phone.as_deref()),
            siret: optional_siret(&mut errors, "siret", self.siret.as_deref()),
            vat_number: optional_vat_number(&mut errors, "vat_number", self.vat_number.as_deref()),
            website: optional_website(&mut errors, "website", self.website.as_deref()),
            notes: optional_text(&mut errors, "notes", self.notes.as_deref(), MAX_NOTES_LENGTH),
        };
        errors.into_result(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierSort {
    #[default]
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SupplierFilter {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub sort: SupplierSort,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        if self.status.is_some_and(|status| status != supplier.status) {
            return false;
        }
        self.search.as_ref().map_or(true, |search| {
            let needle = search.to_lowercase();
            supplier.name.to_lowercase().contains(&needle)
                || supplier
                    .email
                    .as_deref()
                    .is_some_and(|email| email.contains(&needle))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierListQuery {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub sort: Option<SupplierSort>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SupplierListQuery {
    pub fn validate(self) -> Result<SupplierFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let search = optional_text(&mut errors, "search", self.search.as_deref(), 100);
        let page = PageRequest::parse(&mut errors, self.page, self.per_page);
        errors.into_result(SupplierFilter {
            search,
            status: self.status,
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier() -> Supplier {
        let fields = SupplierInput {
            name: "Moulins de Provence".to_string(),
            email: Some("ventes@moulins.fr".to_string()),
            ..SupplierInput::default()
        }
        .validate()
        .unwrap();
        Supplier::new(Uuid::new_v4(), fields)
    }

    #[test]
    fn name_required() {
        let errors = SupplierInput::default().validate().unwrap_err();
        assert!(errors.contains("name"));
    }

    #[test]
    fn new_supplier_is_active() {
        assert_eq!(supplier().status, LifecycleStatus::Active);
    }

    #[test]
    fn inactive_then_archived() {
        let mut supplier = supplier();
        assert_eq!(supplier.change_status(LifecycleStatus::Inactive), Ok(true));
        assert_eq!(supplier.change_status(LifecycleStatus::Archived), Ok(true));
        assert!(supplier.change_status(LifecycleStatus::Inactive).is_err());
    }

    #[test]
    fn filter_by_search_and_status() {
        let supplier = supplier();
        let filter = SupplierFilter {
            search: Some("moulins".to_string()),
            status: Some(LifecycleStatus::Active),
            ..SupplierFilter::default()
        };
        assert!(filter.matches(&supplier));

        let filter = SupplierFilter {
            search: Some("minoterie".to_string()),
            ..SupplierFilter::default()
        };
        assert!(!filter.matches(&supplier));
    }
}
