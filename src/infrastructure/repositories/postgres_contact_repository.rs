use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::address::PartyRef;
use crate::domain::contact::Contact;
use crate::domain::repositories::{ContactRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::map_sqlx_error;

/// PostgreSQL implementation of ContactRepository
pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn owner_column(owner: PartyRef) -> &'static str {
    match owner {
        PartyRef::Client(_) => "client_id",
        PartyRef::Supplier(_) => "supplier_id",
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    client_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    job_title: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let owner = PartyRef::from_columns(row.client_id, row.supplier_id).ok_or_else(|| {
            RepositoryError::Database(format!("Contact {} has no single owner", row.id))
        })?;
        Ok(Contact {
            id: row.id,
            owner,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            job_title: row.job_title,
            created_at: row.created_at,
        })
    }
}

const CONTACT_COLUMNS: &str =
    "id, client_id, supplier_id, first_name, last_name, email, phone, job_title, created_at";

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {} FROM contacts WHERE {} = $1 ORDER BY lower(last_name), lower(first_name), id",
            CONTACT_COLUMNS,
            owner_column(owner)
        ))
        .bind(owner.id())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list contacts", e))?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {} FROM contacts WHERE {} = $1 AND id = $2",
            CONTACT_COLUMNS,
            owner_column(owner)
        ))
        .bind(owner.id())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find contact by id", e))?;

        row.map(Contact::try_from).transpose()
    }

    async fn create(&self, contact: &Contact) -> RepositoryResult<()> {
        let (client_id, supplier_id) = contact.owner.columns();
        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, client_id, supplier_id, first_name, last_name, email, phone,
                job_title, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(contact.id)
        .bind(client_id)
        .bind(supplier_id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.job_title)
        .bind(contact.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create contact", e))?;

        Ok(())
    }

    async fn update(&self, contact: &Contact) -> RepositoryResult<()> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE contacts
            SET first_name = $3, last_name = $4, email = $5, phone = $6, job_title = $7
            WHERE {} = $1 AND id = $2
            "#,
            owner_column(contact.owner)
        ))
        .bind(contact.owner.id())
        .bind(contact.id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.job_title)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to update contact", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Contact {}", contact.id)));
        }
        Ok(())
    }

    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM contacts WHERE {} = $1 AND id = $2",
            owner_column(owner)
        ))
        .bind(owner.id())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to delete contact", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Contact {}", id)));
        }
        Ok(())
    }
}
