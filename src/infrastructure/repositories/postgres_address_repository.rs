use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::address::{Address, PartyRef};
use crate::domain::repositories::{AddressRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::map_sqlx_error;

/// PostgreSQL implementation of AddressRepository
///
/// Default-address changes lock the owner row first so concurrent edits of
/// the same owner's addresses are serialized.
pub struct PostgresAddressRepository {
    pool: PgPool,
}

impl PostgresAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_for_owner(&self, owner: PartyRef) -> RepositoryResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        let (table, _) = owner_columns(owner);
        let locked = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
            table
        ))
        .bind(owner.id())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to lock address owner", e))?;

        if locked.is_none() {
            return Err(RepositoryError::NotFound(owner.to_string()));
        }
        Ok(tx)
    }
}

/// `(owner table, owner column)` for a party
fn owner_columns(owner: PartyRef) -> (&'static str, &'static str) {
    match owner {
        PartyRef::Client(_) => ("clients", "client_id"),
        PartyRef::Supplier(_) => ("suppliers", "supplier_id"),
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    client_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    label: Option<String>,
    line1: String,
    line2: Option<String>,
    postal_code: String,
    city: String,
    country: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let owner = PartyRef::from_columns(row.client_id, row.supplier_id).ok_or_else(|| {
            RepositoryError::Database(format!("Address {} has no single owner", row.id))
        })?;
        Ok(Address {
            id: row.id,
            owner,
            label: row.label,
            line1: row.line1,
            line2: row.line2,
            postal_code: row.postal_code,
            city: row.city,
            country: row.country,
            is_default: row.is_default,
            created_at: row.created_at,
        })
    }
}

const ADDRESS_COLUMNS: &str = "id, client_id, supplier_id, label, line1, line2, postal_code, \
     city, country, is_default, created_at";

async fn clear_default(
    tx: &mut Transaction<'static, Postgres>,
    owner: PartyRef,
    keep: Uuid,
) -> RepositoryResult<()> {
    let (_, column) = owner_columns(owner);
    sqlx::query(&format!(
        "UPDATE addresses SET is_default = FALSE WHERE {} = $1 AND is_default AND id <> $2",
        column
    ))
    .bind(owner.id())
    .bind(keep)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("Failed to clear default address", e))?;
    Ok(())
}

#[async_trait]
impl AddressRepository for PostgresAddressRepository {
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Address>> {
        let (_, column) = owner_columns(owner);
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {} FROM addresses WHERE {} = $1 ORDER BY is_default DESC, created_at DESC, id",
            ADDRESS_COLUMNS, column
        ))
        .bind(owner.id())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list addresses", e))?;

        rows.into_iter().map(Address::try_from).collect()
    }

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Address>> {
        let (_, column) = owner_columns(owner);
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {} FROM addresses WHERE {} = $1 AND id = $2",
            ADDRESS_COLUMNS, column
        ))
        .bind(owner.id())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find address by id", e))?;

        row.map(Address::try_from).transpose()
    }

    async fn create(&self, address: &Address) -> RepositoryResult<Address> {
        let mut tx = self.begin_for_owner(address.owner).await?;
        let (_, column) = owner_columns(address.owner);

        let existing = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM addresses WHERE {} = $1",
            column
        ))
        .bind(address.owner.id())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to count addresses", e))?;

        let mut stored = address.clone();
        stored.is_default = existing == 0 || address.is_default;
        if stored.is_default {
            clear_default(&mut tx, stored.owner, stored.id).await?;
        }

        let (client_id, supplier_id) = stored.owner.columns();
        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, client_id, supplier_id, label, line1, line2, postal_code,
                city, country, is_default, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(stored.id)
        .bind(client_id)
        .bind(supplier_id)
        .bind(&stored.label)
        .bind(&stored.line1)
        .bind(&stored.line2)
        .bind(&stored.postal_code)
        .bind(&stored.city)
        .bind(&stored.country)
        .bind(stored.is_default)
        .bind(stored.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to create address", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit address", e))?;
        Ok(stored)
    }

    async fn update(&self, address: &Address) -> RepositoryResult<Address> {
        let mut tx = self.begin_for_owner(address.owner).await?;
        if address.is_default {
            clear_default(&mut tx, address.owner, address.id).await?;
        }

        // an edit never clears the flag: the row may have been promoted
        // since the caller read it
        let (_, column) = owner_columns(address.owner);
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            UPDATE addresses
            SET label = $3, line1 = $4, line2 = $5, postal_code = $6, city = $7,
                country = $8, is_default = is_default OR $9
            WHERE {} = $1 AND id = $2
            RETURNING {}
            "#,
            column, ADDRESS_COLUMNS
        ))
        .bind(address.owner.id())
        .bind(address.id)
        .bind(&address.label)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.postal_code)
        .bind(&address.city)
        .bind(&address.country)
        .bind(address.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to update address", e))?
        .ok_or_else(|| RepositoryError::NotFound(format!("Address {}", address.id)))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit address", e))?;
        Address::try_from(row)
    }

    async fn set_default(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()> {
        let mut tx = self.begin_for_owner(owner).await?;
        clear_default(&mut tx, owner, id).await?;

        let (_, column) = owner_columns(owner);
        let result = sqlx::query(&format!(
            "UPDATE addresses SET is_default = TRUE WHERE {} = $1 AND id = $2",
            column
        ))
        .bind(owner.id())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to set default address", e))?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls back the cleared default
            return Err(RepositoryError::NotFound(format!("Address {}", id)));
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit default address", e))
    }

    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Uuid>> {
        let mut tx = self.begin_for_owner(owner).await?;
        let (_, column) = owner_columns(owner);

        let was_default = sqlx::query_scalar::<_, bool>(&format!(
            "DELETE FROM addresses WHERE {} = $1 AND id = $2 RETURNING is_default",
            column
        ))
        .bind(owner.id())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Failed to delete address", e))?
        .ok_or_else(|| RepositoryError::NotFound(format!("Address {}", id)))?;

        let mut new_default = None;
        if was_default {
            new_default = sqlx::query_scalar::<_, Uuid>(&format!(
                r#"
                UPDATE addresses SET is_default = TRUE
                WHERE id = (
                    SELECT id FROM addresses WHERE {} = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                )
                RETURNING id
                "#,
                column
            ))
            .bind(owner.id())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to reassign default address", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit address deletion", e))?;
        Ok(new_default)
    }
}
