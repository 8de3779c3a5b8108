// Fiscal years (exercices comptables) of an organization

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::validation::{required_text, FieldErrors};

/// Longest fiscal year French law allows (a first year may run up to 24 months)
pub const MAX_DURATION_MONTHS: u32 = 24;

/// Represents the lifecycle status of a fiscal year
///
/// # Status Transitions
/// ```text
/// Open <-> Closed -> Archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fiscal_year_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    /// Entries can still be booked
    Open,
    /// Books are closed; can be reopened
    Closed,
    /// Permanently closed
    Archived,
}

impl FiscalYearStatus {
    pub fn can_transition_to(&self, next: FiscalYearStatus) -> bool {
        use FiscalYearStatus::*;
        matches!(
            (self, next),
            (Open, Closed) | (Closed, Open) | (Closed, Archived)
        )
    }
}

impl std::fmt::Display for FiscalYearStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FiscalYearStatus::Open => write!(f, "open"),
            FiscalYearStatus::Closed => write!(f, "closed"),
            FiscalYearStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Fiscal year entity
///
/// # Invariants
/// - `start_date < end_date`, both inclusive
/// - Lasts at most [`MAX_DURATION_MONTHS`] months
/// - Never overlaps another fiscal year of the same organization
/// - Dates only change while open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FiscalYear {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: FiscalYearStatus,
    pub created_at: DateTime<Utc>,
}

impl FiscalYear {
    pub fn new(organization_id: Uuid, fields: FiscalYearFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            name: fields.name,
            start_date: fields.start_date,
            end_date: fields.end_date,
            status: FiscalYearStatus::Open,
            created_at: Utc::now(),
        }
    }

    /// Applies an edit; only the name may change once the year is closed
    pub fn apply(&mut self, fields: FiscalYearFields) -> Result<(), String> {
        let dates_changed = fields.start_date != self.start_date || fields.end_date != self.end_date;
        if dates_changed && self.status != FiscalYearStatus::Open {
            return Err(format!(
                "Les dates d'un exercice {} ne peuvent pas être modifiées",
                self.status
            ));
        }
        self.name = fields.name;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        Ok(())
    }

    pub fn change_status(&mut self, next: FiscalYearStatus) -> Result<bool, String> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Transition de statut impossible : {} vers {}",
                self.status, next
            ));
        }
        self.status = next;
        Ok(true)
    }

    pub fn can_be_deleted(&self) -> bool {
        self.status == FiscalYearStatus::Open
    }

    /// Inclusive date ranges overlap
    pub fn overlaps(&self, start_date: NaiveDate, end_date: NaiveDate) -> bool {
        self.start_date <= end_date && start_date <= self.end_date
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FiscalYearInput {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiscalYearFields {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FiscalYearInput {
    pub fn validate(self) -> Result<FiscalYearFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 1, 100);

        if self.start_date.is_none() {
            errors.add("start_date", "La date de début est requise");
        }
        if self.end_date.is_none() {
            errors.add("end_date", "La date de fin est requise");
        }

        match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) => {
                if end_date <= start_date {
                    errors.add("end_date", "La date de fin doit être postérieure à la date de début");
                } else if !within_max_duration(start_date, end_date) {
                    errors.add(
                        "end_date",
                        format!("Un exercice dure au plus {} mois", MAX_DURATION_MONTHS),
                    );
                }
                errors.into_result(FiscalYearFields {
                    name,
                    start_date,
                    end_date,
                })
            }
            _ => Err(errors),
        }
    }
}

fn within_max_duration(start_date: NaiveDate, end_date: NaiveDate) -> bool {
    match start_date.checked_add_months(Months::new(MAX_DURATION_MONTHS)) {
        Some(limit) => end_date < limit,
        None => false,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FiscalYearStatusInput {
    pub status: Option<FiscalYearStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(start: NaiveDate, end: NaiveDate) -> FiscalYearInput {
        FiscalYearInput {
            name: "Exercice 2025".to_string(),
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    fn fiscal_year() -> FiscalYear {
        FiscalYear::new(
            Uuid::new_v4(),
            input(date(2025, 1, 1), date(2025, 12, 31)).validate().unwrap(),
        )
    }

    #[test]
    fn calendar_year_is_valid() {
        let fiscal_year = fiscal_year();
        assert_eq!(fiscal_year.status, FiscalYearStatus::Open);
        assert_eq!(fiscal_year.end_date, date(2025, 12, 31));
    }

    #[test]
    fn end_before_start_rejected() {
        let errors = input(date(2025, 12, 31), date(2025, 1, 1)).validate().unwrap_err();
        assert!(errors.contains("end_date"));
    }

    #[test]
    fn twenty_four_months_is_the_limit() {
        assert!(input(date(2024, 7, 1), date(2026, 6, 30)).validate().is_ok());
        assert!(input(date(2024, 7, 1), date(2026, 7, 1)).validate().is_err());
    }

    #[test]
    fn missing_dates_reported() {
        let errors = FiscalYearInput::default().validate().unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("start_date"));
        assert!(errors.contains("end_date"));
    }

    #[test]
    fn overlap_is_inclusive() {
        let fiscal_year = fiscal_year();
        assert!(fiscal_year.overlaps(date(2025, 12, 31), date(2026, 12, 30)));
        assert!(!fiscal_year.overlaps(date(2026, 1, 1), date(2026, 12, 31)));
        assert!(fiscal_year.overlaps(date(2024, 1, 1), date(2027, 1, 1)));
    }

    #[test]
    fn status_transitions() {
        use FiscalYearStatus::*;
        assert!(Open.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Open));
        assert!(Closed.can_transition_to(Archived));
        assert!(!Open.can_transition_to(Archived));
        assert!(!Archived.can_transition_to(Open));
    }

    #[test]
    fn closed_year_keeps_its_dates() {
        let mut fiscal_year = fiscal_year();
        fiscal_year.change_status(FiscalYearStatus::Closed).unwrap();

        let moved = input(date(2025, 2, 1), date(2026, 1, 31)).validate().unwrap();
        assert!(fiscal_year.apply(moved).is_err());

        let renamed = FiscalYearFields {
            name: "Exercice 2025 (clos)".to_string(),
            start_date: fiscal_year.start_date,
            end_date: fiscal_year.end_date,
        };
        assert!(fiscal_year.apply(renamed).is_ok());
        assert_eq!(fiscal_year.name, "Exercice 2025 (clos)");
    }

    #[test]
    fn only_open_years_can_be_deleted() {
        let mut fiscal_year = fiscal_year();
        assert!(fiscal_year.can_be_deleted());
        fiscal_year.change_status(FiscalYearStatus::Closed).unwrap();
        assert!(!fiscal_year.can_be_deleted());
    }

    #[test]
    fn same_status_is_noop() {
        let mut fiscal_year = fiscal_year();
        assert_eq!(fiscal_year.change_status(FiscalYearStatus::Open), Ok(false));
    }
}
