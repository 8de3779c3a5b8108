use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::client::{Client, ClientFilter, ClientSort};
use crate::domain::repositories::{ClientRepository, RepositoryError, RepositoryResult};
use crate::domain::shared::Page;
use crate::infrastructure::database::{like_pattern, map_sqlx_error};

/// PostgreSQL implementation of ClientRepository
///
/// Listings are assembled with a `QueryBuilder` so only the filters that
/// are set end up in the `WHERE` clause.
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CLIENT_COLUMNS: &str = "id, organization_id, kind, name, email, phone, siret, vat_number, \
     website, notes, status, created_at, updated_at";

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, organization_id: Uuid, filter: &ClientFilter) {
    builder
        .push(" WHERE organization_id = ")
        .push_bind(organization_id);

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ").push_bind(kind);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn sort_column(sort: ClientSort) -> &'static str {
    match sort {
        ClientSort::Name => "lower(name)",
        ClientSort::CreatedAt => "created_at",
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn create(&self, client: &Client) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id, organization_id, kind, name, email, phone, siret, vat_number,
                website, notes, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(client.id)
        .bind(client.organization_id)
        .bind(client.kind)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.siret)
        .bind(&client.vat_number)
        .bind(&client.website)
        .bind(&client.notes)
        .bind(client.status)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create client", e))?;

        Ok(())
    }

    async fn update(&self, client: &Client) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET kind = $3, name = $4, email = $5, phone = $6, siret = $7,
                vat_number = $8, website = $9, notes = $10, status = $11, updated_at = $12
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(client.organization_id)
        .bind(client.id)
        .bind(client.kind)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.siret)
        .bind(&client.vat_number)
        .bind(&client.website)
        .bind(&client.notes)
        .bind(client.status)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update client", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Client {}", client.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Client>> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients WHERE organization_id = $1 AND id = $2",
            CLIENT_COLUMNS
        ))
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find client by id", e))
    }

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Client>> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients WHERE organization_id = $1 AND lower(email) = lower($2)",
            CLIENT_COLUMNS
        ))
        .bind(organization_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find client by email", e))
    }

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Client>> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM clients WHERE organization_id = $1 AND siret = $2",
            CLIENT_COLUMNS
        ))
        .bind(organization_id)
        .bind(siret)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find client by siret", e))
    }

    async fn list(&self, organization_id: Uuid, filter: &ClientFilter) -> RepositoryResult<Page<Client>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients");
        push_filter(&mut count, organization_id, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to count clients", e))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM clients", CLIENT_COLUMNS));
        push_filter(&mut select, organization_id, filter);
        select
            .push(format!(
                " ORDER BY {} {}, id",
                sort_column(filter.sort),
                filter.direction.as_sql()
            ))
            .push(" LIMIT ")
            .push_bind(filter.page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);

        let items = select
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list clients", e))?;

        Ok(Page::new(items, total.max(0) as u64, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete client", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Client {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientKind;
    use crate::domain::shared::LifecycleStatus;

    #[test]
    fn filter_only_adds_set_clauses() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients");
        push_filter(&mut builder, Uuid::new_v4(), &ClientFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM clients WHERE organization_id = $1");
    }

    #[test]
    fn filter_with_everything() {
        let filter = ClientFilter {
            search: Some("dupont".to_string()),
            status: Some(LifecycleStatus::Active),
            kind: Some(ClientKind::Company),
            ..ClientFilter::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clients");
        push_filter(&mut builder, Uuid::new_v4(), &filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM clients WHERE organization_id = $1 AND status = $2 \
             AND kind = $3 AND (name ILIKE $4 OR email ILIKE $5)"
        );
    }
}
