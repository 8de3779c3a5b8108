use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::value_objects::{Siret, VatNumber};
use crate::domain::user::value_objects::Email;

/// Per-field validation messages collected while checking a form submission
///
/// Fields are kept in sorted order so that the serialized envelope is stable.
///
/// # Example
/// ```
/// use comptoir_api::domain::shared::validation::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("name", "Le nom est requis");
/// assert!(errors.contains("name"));
/// assert!(errors.into_result(()).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Trims a mandatory text field and checks its length in characters
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> String {
    let value = value.trim();
    let length = value.chars().count();
    if length == 0 {
        errors.add(field, "Ce champ est requis");
    } else if length < min {
        errors.add(field, format!("Doit contenir au moins {} caractères", min));
    } else if length > max {
        errors.add(field, format!("Doit contenir au plus {} caractères", max));
    }
    value.to_string()
}

/// Trims an optional text field; blank values become `None`
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.chars().count() > max {
        errors.add(field, format!("Doit contenir au plus {} caractères", max));
    }
    Some(value.to_string())
}

pub fn optional_email(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let value = optional_text(errors, field, value, 254)?;
    match Email::new(value.to_lowercase()) {
        Ok(email) => Some(email.as_str().to_string()),
        Err(_) => {
            errors.add(field, "Adresse e-mail invalide");
            None
        }
    }
}

/// Accepts digits and the usual separators, with an optional leading `+`
pub fn optional_phone(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let value = optional_text(errors, field, value, 30)?;
    let body = value.strip_prefix('+').unwrap_or(&value);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '.' | '-' | '(' | ')'));
    let digits = body.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(6..=15).contains(&digits) {
        errors.add(field, "Numéro de téléphone invalide");
        return None;
    }
    Some(value)
}

pub fn optional_website(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    let value = optional_text(errors, field, value, 255)?;
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Some(value),
        _ => {
            errors.add(field, "L'URL doit commencer par http:// ou https://");
            None
        }
    }
}

pub fn optional_siret(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    let value = optional_text(errors, field, value, 20)?;
    match Siret::new(&value) {
        Ok(siret) => Some(siret.into_inner()),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

pub fn optional_vat_number(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    let value = optional_text(errors, field, value, 20)?;
    match VatNumber::new(&value) {
        Ok(vat) => Some(vat.into_inner()),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_accepts() {
        let mut errors = FieldErrors::new();
        let value = required_text(&mut errors, "name", "  Dupont  ", 2, 100);
        assert_eq!(value, "Dupont");
        assert!(errors.is_empty());
    }

    #[test]
    fn required_text_rejects_blank() {
        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", "   ", 2, 100);
        assert_eq!(errors.get("name"), Some(&["Ce champ est requis".to_string()][..]));
    }

    #[test]
    fn required_text_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", "éé", 2, 2);
        assert!(errors.is_empty());
    }

    #[test]
    fn optional_text_blank_is_none() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "notes", Some("  "), 10), None);
        assert_eq!(optional_text(&mut errors, "notes", None, 10), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn optional_text_too_long() {
        let mut errors = FieldErrors::new();
        optional_text(&mut errors, "notes", Some("abcdef"), 5);
        assert!(errors.contains("notes"));
    }

    #[test]
    fn email_is_lowercased() {
        let mut errors = FieldErrors::new();
        let email = optional_email(&mut errors, "email", Some("Contact@Exemple.FR"));
        assert_eq!(email.as_deref(), Some("contact@exemple.fr"));
    }

    #[test]
    fn invalid_email_reported() {
        let mut errors = FieldErrors::new();
        assert!(optional_email(&mut errors, "email", Some("pas-un-email")).is_none());
        assert!(errors.contains("email"));
    }

    #[test]
    fn phone_formats() {
        let mut errors = FieldErrors::new();
        assert!(optional_phone(&mut errors, "phone", Some("+33 1 23 45 67 89")).is_some());
        assert!(optional_phone(&mut errors, "phone", Some("01.23.45.67.89")).is_some());
        assert!(errors.is_empty());

        assert!(optional_phone(&mut errors, "phone", Some("12ab")).is_none());
        assert!(errors.contains("phone"));
    }

    #[test]
    fn website_requires_scheme() {
        let mut errors = FieldErrors::new();
        assert!(optional_website(&mut errors, "website", Some("https://exemple.fr")).is_some());
        assert!(errors.is_empty());
        assert!(optional_website(&mut errors, "website", Some("exemple.fr")).is_none());
        assert!(errors.contains("website"));
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.add("b", "deux");
        errors.add("a", "un");
        assert_eq!(errors.to_string(), "a: un; b: deux");
    }

    #[test]
    fn serializes_as_map() {
        let errors = FieldErrors::single("name", "Ce champ est requis");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0], "Ce champ est requis");
    }
}
