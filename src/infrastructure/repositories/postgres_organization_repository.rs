use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::member::{Member, Role};
use crate::domain::organization::{Organization, OrganizationMembership};
use crate::domain::repositories::{OrganizationRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::map_sqlx_error;

/// PostgreSQL implementation of OrganizationRepository
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    #[sqlx(flatten)]
    organization: Organization,
    role: Role,
}

const ORGANIZATION_COLUMNS: &str = "o.id, o.name, o.legal_form, o.siret, o.vat_number, o.email, \
     o.phone, o.website, o.currency, o.created_by, o.created_at, o.updated_at";

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn create(&self, organization: &Organization, owner: &Member) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO organizations (
                id, name, legal_form, siret, vat_number, email, phone, website,
                currency, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.legal_form)
        .bind(&organization.siret)
        .bind(&organization.vat_number)
        .bind(&organization.email)
        .bind(&organization.phone)
        .bind(&organization.website)
        .bind(&organization.currency)
        .bind(organization.created_by)
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to create organization", e))?;

        sqlx::query(
            r#"
            INSERT INTO members (id, organization_id, user_id, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(owner.id)
        .bind(owner.organization_id)
        .bind(owner.user_id)
        .bind(owner.role)
        .bind(owner.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to create owner membership", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit organization", e))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations o WHERE o.id = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find organization by id", e))
    }

    async fn find_by_siret(&self, siret: &str) -> RepositoryResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations o WHERE o.siret = $1",
            ORGANIZATION_COLUMNS
        ))
        .bind(siret)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find organization by siret", e))
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<OrganizationMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {}, m.role
            FROM organizations o
            JOIN members m ON m.organization_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.name, o.id
            "#,
            ORGANIZATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list organizations for user", e))?;

        Ok(rows
            .into_iter()
            .map(|row| OrganizationMembership {
                organization: row.organization,
                role: row.role,
            })
            .collect())
    }

    async fn update(&self, organization: &Organization) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET name = $2, legal_form = $3, siret = $4, vat_number = $5, email = $6,
                phone = $7, website = $8, currency = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.legal_form)
        .bind(&organization.siret)
        .bind(&organization.vat_number)
        .bind(&organization.email)
        .bind(&organization.phone)
        .bind(&organization.website)
        .bind(&organization.currency)
        .bind(organization.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update organization", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Organization {}", organization.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete organization", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Organization {}", id)));
        }
        Ok(())
    }
}
