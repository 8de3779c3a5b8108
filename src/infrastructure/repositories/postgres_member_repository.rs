use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::member::{Member, MemberWithUser, Role};
use crate::domain::repositories::member_repository::LAST_OWNER;
use crate::domain::repositories::{MemberRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::map_sqlx_error;

/// PostgreSQL implementation of MemberRepository
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepositoryResult<Option<Member>> {
        sqlx::query_as::<_, Member>(
            r#"
            SELECT id, organization_id, user_id, role, created_at
            FROM members
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find membership", e))
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Member>> {
        sqlx::query_as::<_, Member>(
            r#"
            SELECT id, organization_id, user_id, role, created_at
            FROM members
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to find member by id", e))
    }

    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<MemberWithUser>> {
        sqlx::query_as::<_, MemberWithUser>(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.role, u.email, u.full_name, m.created_at
            FROM members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY (m.role = 'owner') DESC, u.full_name, m.id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to list members", e))
    }

    async fn list_user_ids(&self, organization_id: Uuid) -> RepositoryResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM members WHERE organization_id = $1")
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to list member user ids", e))
    }

    async fn create(&self, member: &Member) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, organization_id, user_id, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.id)
        .bind(member.organization_id)
        .bind(member.user_id)
        .bind(member.role)
        .bind(member.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("Failed to create member", e))?;

        Ok(())
    }

    async fn update_role(&self, organization_id: Uuid, id: Uuid, role: Role) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;
        if role != Role::Owner {
            guard_last_owner(&mut tx, organization_id, id).await?;
        }

        let result = sqlx::query("UPDATE members SET role = $3 WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to update member role", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Member {}", id)));
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit member role", e))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;
        guard_last_owner(&mut tx, organization_id, id).await?;

        let result = sqlx::query("DELETE FROM members WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Failed to delete member", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Member {}", id)));
        }
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit member removal", e))
    }
}

/// Locks the organization's owner rows and refuses to take away the last one
///
/// Concurrent demotions queue on the row locks; once one commits, the next
/// re-reads the owners without the demoted row.
async fn guard_last_owner(
    tx: &mut Transaction<'static, Postgres>,
    organization_id: Uuid,
    id: Uuid,
) -> RepositoryResult<()> {
    let owners = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM members WHERE organization_id = $1 AND role = 'owner' FOR UPDATE",
    )
    .bind(organization_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("Failed to lock owners", e))?;

    if owners.contains(&id) && owners.len() <= 1 {
        return Err(RepositoryError::Conflict(LAST_OWNER.to_string()));
    }
    Ok(())
}
