use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::{optional_text, required_text, FieldErrors};

/// Grouping for products; names are unique per organization, ignoring case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductCategory {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductCategory {
    pub fn new(organization_id: Uuid, fields: CategoryFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            name: fields.name,
            description: fields.description,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, fields: CategoryFields) {
        self.name = fields.name;
        self.description = fields.description;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFields {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn validate(self) -> Result<CategoryFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = CategoryFields {
            name: required_text(&mut errors, "name", &self.name, 1, 80),
            description: optional_text(&mut errors, "description", self.description.as_deref(), 500),
        };
        errors.into_result(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_required() {
        assert!(CategoryInput::default().validate().is_err());
    }

    #[test]
    fn description_blank_is_none() {
        let fields = CategoryInput {
            name: "Viennoiseries".to_string(),
            description: Some("  ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(fields.description, None);
    }
}
