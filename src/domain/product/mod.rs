// Product catalogue: goods and services with French VAT rates

pub mod category;

pub use category::{CategoryFields, CategoryInput, ProductCategory};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::{optional_text, required_text, FieldErrors};
use crate::domain::shared::{LifecycleStatus, PageRequest, SortDirection};

/// Upper bound imposed by the `NUMERIC(12, 2)` column
pub fn max_unit_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// French VAT rates in percent: 0, 2.1, 5.5, 10, 20
pub fn allowed_vat_rates() -> [Decimal; 5] {
    [
        Decimal::ZERO,
        Decimal::new(21, 1),
        Decimal::new(55, 1),
        Decimal::new(10, 0),
        Decimal::new(20, 0),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Good,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductUnit {
    Unit,
    Hour,
    Day,
    Kilogram,
    Meter,
    Package,
}

/// Product aggregate
///
/// # Invariants
/// - Reference is unique within the organization
/// - Unit price is non-negative with at most two decimals
/// - VAT rate is one of [`allowed_vat_rates`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub category_id: Option<Uuid>,
    pub reference: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: ProductKind,
    pub unit: ProductUnit,
    pub unit_price: Decimal,
    pub vat_rate: Decimal,
    pub status: LifecycleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(organization_id: Uuid, fields: ProductFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            category_id: fields.category_id,
            reference: fields.reference,
            name: fields.name,
            description: fields.description,
            kind: fields.kind,
            unit: fields.unit,
            unit_price: fields.unit_price,
            vat_rate: fields.vat_rate,
            status: LifecycleStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, fields: ProductFields) {
        self.category_id = fields.category_id;
        self.reference = fields.reference;
        self.name = fields.name;
        self.description = fields.description;
        self.kind = fields.kind;
        self.unit = fields.unit;
        self.unit_price = fields.unit_price;
        self.vat_rate = fields.vat_rate;
        self.updated_at = Utc::now();
    }

    pub fn change_status(&mut self, next: LifecycleStatus) -> Result<bool, String> {
        let changed = self.status.transition(next)?;
        if changed {
            self.updated_at = Utc::now();
        }
        Ok(changed)
    }

    /// Unit price including VAT, rounded to the cent
    pub fn price_including_vat(&self) -> Decimal {
        let vat = self.unit_price * self.vat_rate / Decimal::ONE_HUNDRED;
        (self.unit_price + vat).round_dp(2)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
    pub category_id: Option<Uuid>,
    pub reference: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<ProductKind>,
    pub unit: Option<ProductUnit>,
    pub unit_price: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub category_id: Option<Uuid>,
    pub reference: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: ProductKind,
    pub unit: ProductUnit,
    pub unit_price: Decimal,
    pub vat_rate: Decimal,
}

impl ProductInput {
    pub fn validate(self) -> Result<ProductFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let reference = required_text(&mut errors, "reference", &self.reference, 1, 50);
        let name = required_text(&mut errors, "name", &self.name, 1, 150);
        let description = optional_text(&mut errors, "description", self.description.as_deref(), 2000);

        let kind = self.kind.unwrap_or(ProductKind::Good);
        let unit = self.unit.unwrap_or(match kind {
            ProductKind::Good => ProductUnit::Unit,
            ProductKind::Service => ProductUnit::Hour,
        });

        let unit_price = self.unit_price.unwrap_or_else(|| {
            errors.add("unit_price", "Le prix unitaire est requis");
            Decimal::ZERO
        });
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            errors.add("unit_price", "Le prix unitaire ne peut pas être négatif");
        } else if unit_price.normalize().scale() > 2 {
            errors.add("unit_price", "Le prix unitaire a au plus 2 décimales");
        } else if unit_price > max_unit_price() {
            errors.add("unit_price", "Le prix unitaire est trop élevé");
        }

        let vat_rate = self.vat_rate.unwrap_or(Decimal::new(20, 0));
        if !allowed_vat_rates().contains(&vat_rate) {
            errors.add(
                "vat_rate",
                "Taux de TVA invalide (0, 2,1, 5,5, 10 ou 20 %)",
            );
        }

        errors.into_result(ProductFields {
            category_id: self.category_id,
            reference,
            name,
            description,
            kind,
            unit,
            unit_price: unit_price.round_dp(2),
            vat_rate: vat_rate.normalize(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Name,
    Reference,
    UnitPrice,
    CreatedAt,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub kind: Option<ProductKind>,
    pub category_id: Option<Uuid>,
    pub sort: ProductSort,
    pub direction: SortDirection,
    pub page: PageRequest,
}

impl ProductFilter {
    /// Case-insensitive match on name or reference
    pub fn matches(&self, product: &Product) -> bool {
        if self.status.is_some_and(|status| status != product.status)
            || self.kind.is_some_and(|kind| kind != product.kind)
        {
            return false;
        }
        if self.category_id.is_some() && self.category_id != product.category_id {
            return false;
        }
        self.search.as_ref().map_or(true, |search| {
            let needle = search.to_lowercase();
            product.name.to_lowercase().contains(&needle)
                || product.reference.to_lowercase().contains(&needle)
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub status: Option<LifecycleStatus>,
    pub kind: Option<ProductKind>,
    pub category_id: Option<Uuid>,
    pub sort: Option<ProductSort>,
    pub direction: Option<SortDirection>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductListQuery {
    pub fn validate(self) -> Result<ProductFilter, FieldErrors> {
        let mut errors = FieldErrors::new();
        let search = optional_text(&mut errors, "search", self.search.as_deref(), 100);
        let page = PageRequest::parse(&mut errors, self.page, self.per_page);
        errors.into_result(ProductFilter {
            search,
            status: self.status,
            kind: self.kind,
            category_id: self.category_id,
            sort: self.sort.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            category_id: None,
            reference: "BAG-001".to_string(),
            name: "Baguette tradition".to_string(),
            description: None,
            kind: Some(ProductKind::Good),
            unit: None,
            unit_price: Some(Decimal::new(120, 2)),
            vat_rate: Some(Decimal::new(55, 1)),
        }
    }

    #[test]
    fn valid_product() {
        let fields = input().validate().expect("valid product");
        assert_eq!(fields.unit, ProductUnit::Unit);
        assert_eq!(fields.vat_rate, Decimal::new(55, 1));
    }

    #[test]
    fn service_defaults_to_hours() {
        let fields = ProductInput {
            kind: Some(ProductKind::Service),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.unit, ProductUnit::Hour);
    }

    #[test]
    fn vat_rate_defaults_to_twenty_percent() {
        let fields = ProductInput {
            vat_rate: None,
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.vat_rate, Decimal::new(20, 0));
    }

    #[test]
    fn unknown_vat_rate_rejected() {
        let errors = ProductInput {
            vat_rate: Some(Decimal::new(196, 1)),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("vat_rate"));
    }

    #[test]
    fn trailing_zeros_accepted_for_vat_rate() {
        let fields = ProductInput {
            vat_rate: Some(Decimal::new(1000, 2)),
            ..input()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.vat_rate, Decimal::new(10, 0));
    }

    #[test]
    fn negative_price_rejected() {
        let errors = ProductInput {
            unit_price: Some(Decimal::new(-1, 0)),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("unit_price"));
    }

    #[test]
    fn sub_cent_price_rejected() {
        let errors = ProductInput {
            unit_price: Some(Decimal::new(1001, 3)),
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("unit_price"));
    }

    #[test]
    fn missing_price_rejected() {
        let errors = ProductInput {
            unit_price: None,
            ..input()
        }
        .validate()
        .unwrap_err();
        assert!(errors.contains("unit_price"));
    }

    #[test]
    fn price_including_vat() {
        let product = Product::new(
            Uuid::new_v4(),
            ProductInput {
                unit_price: Some(Decimal::new(10000, 2)),
                vat_rate: Some(Decimal::new(20, 0)),
                ..input()
            }
            .validate()
            .unwrap(),
        );
        assert_eq!(product.price_including_vat(), Decimal::new(12000, 2));
    }

    #[test]
    fn filter_by_reference_and_category() {
        let category_id = Uuid::new_v4();
        let product = Product::new(
            Uuid::new_v4(),
            ProductInput {
                category_id: Some(category_id),
                ..input()
            }
            .validate()
            .unwrap(),
        );

        let filter = ProductFilter {
            search: Some("bag-".to_string()),
            category_id: Some(category_id),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product));

        let filter = ProductFilter {
            category_id: Some(Uuid::new_v4()),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product));
    }

    #[test]
    fn max_unit_price_is_column_bound() {
        assert_eq!(max_unit_price().to_string(), "9999999999.99");
    }
}
