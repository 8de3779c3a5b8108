// Server actions
//
// One function per operation. Each follows the same sequence: the caller is
// already authenticated (a `Session`), the input is validated, membership and
// permission are checked, the repositories are queried or mutated, affected
// cache tags are invalidated, and the result is returned.

use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::domain::address::PartyRef;
use crate::domain::member::{Member, Permission};
use crate::state::AppState;

pub mod addresses;
pub mod auth;
pub mod clients;
pub mod contacts;
pub mod fiscal_years;
pub mod members;
pub mod organizations;
pub mod product_categories;
pub mod products;
pub mod suppliers;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Checks that the session user belongs to the organization with `permission`
///
/// Non-members get `NOT_FOUND` so organization ids cannot be probed.
pub async fn authorize(
    state: &AppState,
    session: &Session,
    organization_id: Uuid,
    permission: Permission,
) -> Result<Member, ApiError> {
    let member = state
        .repositories
        .members
        .find_membership(organization_id, session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Organisation introuvable"))?;

    if !member.can(permission) {
        tracing::warn!(
            user_id = %session.user_id,
            organization_id = %organization_id,
            role = %member.role,
            ?permission,
            "Permission denied"
        );
        return Err(ApiError::forbidden(
            "Vous n'avez pas les droits nécessaires pour cette action",
        ));
    }
    Ok(member)
}

/// Checks that a client or supplier belongs to the organization
pub(crate) async fn ensure_party(
    state: &AppState,
    organization_id: Uuid,
    owner: PartyRef,
) -> Result<(), ApiError> {
    let found = match owner {
        PartyRef::Client(id) => state
            .repositories
            .clients
            .find_by_id(organization_id, id)
            .await?
            .is_some(),
        PartyRef::Supplier(id) => state
            .repositories
            .suppliers
            .find_by_id(organization_id, id)
            .await?
            .is_some(),
    };
    if found {
        Ok(())
    } else {
        Err(match owner {
            PartyRef::Client(_) => ApiError::not_found("Client introuvable"),
            PartyRef::Supplier(_) => ApiError::not_found("Fournisseur introuvable"),
        })
    }
}

/// Cache key for a filtered listing
pub(crate) fn list_key<F: Serialize>(entity: &str, organization_id: Uuid, filter: &F) -> String {
    let filter = serde_json::to_string(filter).unwrap_or_default();
    format!("{}:{}:{}", entity, organization_id, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientFilter;

    #[test]
    fn list_keys_differ_by_filter() {
        let org = Uuid::new_v4();
        let all = ClientFilter::default();
        let searched = ClientFilter {
            search: Some("dupont".to_string()),
            ..Default::default()
        };
        assert_ne!(
            list_key("clients", org, &all),
            list_key("clients", org, &searched)
        );
        assert_eq!(list_key("clients", org, &all), list_key("clients", org, &all));
    }
}
