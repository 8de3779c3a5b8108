use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::domain::fiscal_year::FiscalYear;

#[async_trait]
pub trait FiscalYearRepository: Send + Sync {
    /// Newest first
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<FiscalYear>>;

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<FiscalYear>>;

    /// Fiscal years intersecting `[start_date, end_date]`, ignoring `exclude`
    async fn find_overlapping(
        &self,
        organization_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> RepositoryResult<Vec<FiscalYear>>;

    async fn create(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()>;

    async fn update(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()>;
}
