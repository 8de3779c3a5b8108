use serde::{Deserialize, Serialize};
use std::fmt;

/// French establishment identifier (14 digits, Luhn checked)
///
/// Spaces are accepted on input and stripped.
///
/// # Example
/// ```
/// use comptoir_api::domain::shared::value_objects::Siret;
///
/// let siret = Siret::new("732 829 320 00074").expect("valid siret");
/// assert_eq!(siret.as_str(), "73282932000074");
/// assert_eq!(siret.siren(), "732829320");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Siret(String);

impl Siret {
    pub fn new(value: &str) -> Result<Self, String> {
        let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() != 14 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("Le SIRET doit contenir 14 chiffres".to_string());
        }
        if !luhn_valid(&digits) {
            return Err("SIRET invalide (clé de contrôle incorrecte)".to_string());
        }
        Ok(Siret(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first nine digits identify the company itself
    pub fn siren(&self) -> &str {
        &self.0[..9]
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Siret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(index, digit)| {
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// French intra-community VAT number: `FR` + 2 key characters + SIREN
///
/// When the key is numeric it must equal `(12 + 3 * (siren % 97)) % 97`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VatNumber(String);

impl VatNumber {
    pub fn new(value: &str) -> Result<Self, String> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        let Some(rest) = normalized.strip_prefix("FR") else {
            return Err("Le numéro de TVA doit commencer par FR".to_string());
        };
        if rest.len() != 11 || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err("Le numéro de TVA doit contenir FR suivi de 11 caractères".to_string());
        }

        let (key, siren) = rest.split_at(2);
        let siren_value: u64 = siren
            .parse()
            .map_err(|_| "Le SIREN du numéro de TVA doit être numérique".to_string())?;
        if let Ok(key_value) = key.parse::<u64>() {
            if key_value != (12 + 3 * (siren_value % 97)) % 97 {
                return Err("Numéro de TVA invalide (clé incorrecte)".to_string());
            }
        }

        Ok(VatNumber(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VatNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 3166-1 alpha-2 country code, stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(value: &str) -> Result<Self, String> {
        let code = value.trim().to_uppercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(CountryCode(code))
        } else {
            Err("Code pays invalide (ISO 3166, 2 lettres)".to_string())
        }
    }

    pub fn france() -> Self {
        CountryCode("FR".to_string())
    }

    pub fn is_france(&self) -> bool {
        self.0 == "FR"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
