// In-memory repository set
//
// Implements every repository port over plain maps behind one lock, with the
// same uniqueness, cascade and default-address rules as the PostgreSQL
// schema. Used when no DATABASE_URL is configured and by the test suites.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::address::{Address, PartyRef};
use crate::domain::client::{Client, ClientFilter, ClientSort};
use crate::domain::contact::Contact;
use crate::domain::fiscal_year::FiscalYear;
use crate::domain::member::{Member, MemberWithUser, Role};
use crate::domain::organization::{Organization, OrganizationMembership};
use crate::domain::product::{Product, ProductCategory, ProductFilter, ProductSort};
use crate::domain::repositories::member_repository::LAST_OWNER;
use crate::domain::repositories::{
    AddressRepository, ClientRepository, ContactRepository, FiscalYearRepository,
    MemberRepository, OrganizationRepository, ProductCategoryRepository, ProductRepository,
    RepositoryError, RepositoryResult, SupplierRepository, UserRepository,
};
use crate::domain::shared::{Page, SortDirection};
use crate::domain::supplier::{Supplier, SupplierFilter, SupplierSort};
use crate::domain::user::value_objects::Email;
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    members: HashMap<Uuid, Member>,
    clients: HashMap<Uuid, Client>,
    suppliers: HashMap<Uuid, Supplier>,
    addresses: HashMap<Uuid, Address>,
    contacts: HashMap<Uuid, Contact>,
    categories: HashMap<Uuid, ProductCategory>,
    products: HashMap<Uuid, Product>,
    fiscal_years: HashMap<Uuid, FiscalYear>,
}

impl Tables {
    fn owner_exists(&self, owner: PartyRef) -> bool {
        match owner {
            PartyRef::Client(id) => self.clients.contains_key(&id),
            PartyRef::Supplier(id) => self.suppliers.contains_key(&id),
        }
    }

    /// Removes an owner's addresses and contacts
    fn drop_party(&mut self, owner: PartyRef) {
        self.addresses.retain(|_, address| address.owner != owner);
        self.contacts.retain(|_, contact| contact.owner != owner);
    }

    fn clear_default(&mut self, owner: PartyRef, keep: Uuid) {
        for address in self.addresses.values_mut() {
            if address.owner == owner && address.id != keep {
                address.is_default = false;
            }
        }
    }

    /// Refuses to take away an organization's last owner
    fn guard_last_owner(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let owners: Vec<Uuid> = self
            .members
            .values()
            .filter(|member| member.organization_id == organization_id && member.is_owner())
            .map(|member| member.id)
            .collect();
        if owners.contains(&id) && owners.len() <= 1 {
            return Err(RepositoryError::Conflict(LAST_OWNER.to_string()));
        }
        Ok(())
    }

    fn check_client_unique(&self, client: &Client) -> RepositoryResult<()> {
        for other in self.clients.values() {
            if other.id == client.id || other.organization_id != client.organization_id {
                continue;
            }
            if same_email(&other.email, &client.email) {
                return Err(RepositoryError::Conflict("clients_organization_email_key".into()));
            }
            if other.siret.is_some() && other.siret == client.siret {
                return Err(RepositoryError::Conflict("clients_organization_siret_key".into()));
            }
        }
        Ok(())
    }

    fn check_supplier_unique(&self, supplier: &Supplier) -> RepositoryResult<()> {
        for other in self.suppliers.values() {
            if other.id == supplier.id || other.organization_id != supplier.organization_id {
                continue;
            }
            if same_email(&other.email, &supplier.email) {
                return Err(RepositoryError::Conflict("suppliers_organization_email_key".into()));
            }
            if other.siret.is_some() && other.siret == supplier.siret {
                return Err(RepositoryError::Conflict("suppliers_organization_siret_key".into()));
            }
        }
        Ok(())
    }

    fn check_organization_unique(&self, organization: &Organization) -> RepositoryResult<()> {
        let taken = self.organizations.values().any(|other| {
            other.id != organization.id
                && other.siret.is_some()
                && other.siret == organization.siret
        });
        if taken {
            return Err(RepositoryError::Conflict("organizations_siret_key".into()));
        }
        Ok(())
    }

    fn check_product(&self, product: &Product) -> RepositoryResult<()> {
        let taken = self.products.values().any(|other| {
            other.id != product.id
                && other.organization_id == product.organization_id
                && other.reference == product.reference
        });
        if taken {
            return Err(RepositoryError::Conflict(
                "products_organization_reference_key".into(),
            ));
        }
        if let Some(category_id) = product.category_id {
            if !self.categories.contains_key(&category_id) {
                return Err(RepositoryError::NotFound("products_category_id_fkey".into()));
            }
        }
        Ok(())
    }

    fn check_category_unique(&self, category: &ProductCategory) -> RepositoryResult<()> {
        let name = category.name.to_lowercase();
        let taken = self.categories.values().any(|other| {
            other.id != category.id
                && other.organization_id == category.organization_id
                && other.name.to_lowercase() == name
        });
        if taken {
            return Err(RepositoryError::Conflict(
                "product_categories_organization_name_key".into(),
            ));
        }
        Ok(())
    }
}

fn same_email(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Every repository port over shared in-process tables
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> RepositoryResult<Uuid> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|other| other.email == user.email) {
            return Err(RepositoryError::Conflict("users_email_key".into()));
        }
        let id = user.id;
        tables.users.insert(id, user);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| &user.email == email).cloned())
    }

    async fn update_last_login(&self, user_id: Uuid) -> RepositoryResult<()> {
        if self.tables.read().await.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("User {}", user_id)))
        }
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn create(&self, organization: &Organization, owner: &Member) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_organization_unique(organization)?;
        if !tables.users.contains_key(&owner.user_id) {
            return Err(RepositoryError::NotFound("members_user_id_fkey".into()));
        }
        tables.organizations.insert(organization.id, organization.clone());
        tables.members.insert(owner.id, owner.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Organization>> {
        Ok(self.tables.read().await.organizations.get(&id).cloned())
    }

    async fn find_by_siret(&self, siret: &str) -> RepositoryResult<Option<Organization>> {
        let tables = self.tables.read().await;
        Ok(tables
            .organizations
            .values()
            .find(|organization| organization.siret.as_deref() == Some(siret))
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepositoryResult<Vec<OrganizationMembership>> {
        let tables = self.tables.read().await;
        let mut memberships: Vec<OrganizationMembership> = tables
            .members
            .values()
            .filter(|member| member.user_id == user_id)
            .filter_map(|member| {
                tables
                    .organizations
                    .get(&member.organization_id)
                    .map(|organization| OrganizationMembership {
                        organization: organization.clone(),
                        role: member.role,
                    })
            })
            .collect();
        memberships.sort_by(|a, b| {
            a.organization
                .name
                .to_lowercase()
                .cmp(&b.organization.name.to_lowercase())
                .then(a.organization.id.cmp(&b.organization.id))
        });
        Ok(memberships)
    }

    async fn update(&self, organization: &Organization) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.organizations.contains_key(&organization.id) {
            return Err(RepositoryError::NotFound(format!("Organization {}", organization.id)));
        }
        tables.check_organization_unique(organization)?;
        tables.organizations.insert(organization.id, organization.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.organizations.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("Organization {}", id)));
        }

        let mut parties: Vec<PartyRef> = tables
            .clients
            .values()
            .filter(|client| client.organization_id == id)
            .map(|client| PartyRef::Client(client.id))
            .collect();
        parties.extend(
            tables
                .suppliers
                .values()
                .filter(|supplier| supplier.organization_id == id)
                .map(|supplier| PartyRef::Supplier(supplier.id)),
        );
        for party in parties {
            tables.drop_party(party);
        }

        tables.members.retain(|_, member| member.organization_id != id);
        tables.clients.retain(|_, client| client.organization_id != id);
        tables.suppliers.retain(|_, supplier| supplier.organization_id != id);
        tables.products.retain(|_, product| product.organization_id != id);
        tables.categories.retain(|_, category| category.organization_id != id);
        tables.fiscal_years.retain(|_, fiscal_year| fiscal_year.organization_id != id);
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RepositoryResult<Option<Member>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .values()
            .find(|member| member.organization_id == organization_id && member.user_id == user_id)
            .cloned())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Member>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .get(&id)
            .filter(|member| member.organization_id == organization_id)
            .cloned())
    }

    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<MemberWithUser>> {
        let tables = self.tables.read().await;
        let mut members: Vec<MemberWithUser> = tables
            .members
            .values()
            .filter(|member| member.organization_id == organization_id)
            .filter_map(|member| {
                tables.users.get(&member.user_id).map(|user| MemberWithUser {
                    id: member.id,
                    organization_id: member.organization_id,
                    user_id: member.user_id,
                    role: member.role,
                    email: user.email.as_str().to_string(),
                    full_name: user.full_name.clone(),
                    created_at: member.created_at,
                })
            })
            .collect();
        members.sort_by(|a, b| {
            (a.role != Role::Owner)
                .cmp(&(b.role != Role::Owner))
                .then(a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()))
                .then(a.id.cmp(&b.id))
        });
        Ok(members)
    }

    async fn list_user_ids(&self, organization_id: Uuid) -> RepositoryResult<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .values()
            .filter(|member| member.organization_id == organization_id)
            .map(|member| member.user_id)
            .collect())
    }

    async fn create(&self, member: &Member) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.members.values().any(|other| {
            other.organization_id == member.organization_id && other.user_id == member.user_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict("members_organization_user_key".into()));
        }
        if !tables.organizations.contains_key(&member.organization_id) {
            return Err(RepositoryError::NotFound("members_organization_id_fkey".into()));
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn update_role(&self, organization_id: Uuid, id: Uuid, role: Role) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if role != Role::Owner {
            tables.guard_last_owner(organization_id, id)?;
        }
        match tables.members.get_mut(&id) {
            Some(member) if member.organization_id == organization_id => {
                member.role = role;
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Member {}", id))),
        }
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.guard_last_owner(organization_id, id)?;
        match tables.members.get(&id) {
            Some(member) if member.organization_id == organization_id => {
                tables.members.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Member {}", id))),
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn create(&self, client: &Client) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_client_unique(client)?;
        tables.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn update(&self, client: &Client) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .clients
            .get(&client.id)
            .is_some_and(|stored| stored.organization_id == client.organization_id);
        if !exists {
            return Err(RepositoryError::NotFound(format!("Client {}", client.id)));
        }
        tables.check_client_unique(client)?;
        tables.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .get(&id)
            .filter(|client| client.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|client| {
                client.organization_id == organization_id
                    && client
                        .email
                        .as_deref()
                        .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|client| {
                client.organization_id == organization_id && client.siret.as_deref() == Some(siret)
            })
            .cloned())
    }

    async fn list(&self, organization_id: Uuid, filter: &ClientFilter) -> RepositoryResult<Page<Client>> {
        let tables = self.tables.read().await;
        let mut clients: Vec<Client> = tables
            .clients
            .values()
            .filter(|client| client.organization_id == organization_id && filter.matches(client))
            .cloned()
            .collect();
        clients.sort_by(|a, b| {
            let ordering = match filter.sort {
                ClientSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ClientSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, filter.direction).then(a.id.cmp(&b.id))
        });
        Ok(Page::from_sorted(clients, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .clients
            .get(&id)
            .is_some_and(|client| client.organization_id == organization_id);
        if !owned {
            return Err(RepositoryError::NotFound(format!("Client {}", id)));
        }
        tables.clients.remove(&id);
        tables.drop_party(PartyRef::Client(id));
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for InMemoryStore {
    async fn create(&self, supplier: &Supplier) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_supplier_unique(supplier)?;
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .suppliers
            .get(&supplier.id)
            .is_some_and(|stored| stored.organization_id == supplier.organization_id);
        if !exists {
            return Err(RepositoryError::NotFound(format!("Supplier {}", supplier.id)));
        }
        tables.check_supplier_unique(supplier)?;
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .get(&id)
            .filter(|supplier| supplier.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_email(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> RepositoryResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .values()
            .find(|supplier| {
                supplier.organization_id == organization_id
                    && supplier
                        .email
                        .as_deref()
                        .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
            })
            .cloned())
    }

    async fn find_by_siret(
        &self,
        organization_id: Uuid,
        siret: &str,
    ) -> RepositoryResult<Option<Supplier>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .values()
            .find(|supplier| {
                supplier.organization_id == organization_id
                    && supplier.siret.as_deref() == Some(siret)
            })
            .cloned())
    }

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &SupplierFilter,
    ) -> RepositoryResult<Page<Supplier>> {
        let tables = self.tables.read().await;
        let mut suppliers: Vec<Supplier> = tables
            .suppliers
            .values()
            .filter(|supplier| {
                supplier.organization_id == organization_id && filter.matches(supplier)
            })
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| {
            let ordering = match filter.sort {
                SupplierSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SupplierSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, filter.direction).then(a.id.cmp(&b.id))
        });
        Ok(Page::from_sorted(suppliers, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .suppliers
            .get(&id)
            .is_some_and(|supplier| supplier.organization_id == organization_id);
        if !owned {
            return Err(RepositoryError::NotFound(format!("Supplier {}", id)));
        }
        tables.suppliers.remove(&id);
        tables.drop_party(PartyRef::Supplier(id));
        Ok(())
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Address>> {
        let tables = self.tables.read().await;
        let mut addresses: Vec<Address> = tables
            .addresses
            .values()
            .filter(|address| address.owner == owner)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(addresses)
    }

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Address>> {
        let tables = self.tables.read().await;
        Ok(tables
            .addresses
            .get(&id)
            .filter(|address| address.owner == owner)
            .cloned())
    }

    async fn create(&self, address: &Address) -> RepositoryResult<Address> {
        let mut tables = self.tables.write().await;
        if !tables.owner_exists(address.owner) {
            return Err(RepositoryError::NotFound(address.owner.to_string()));
        }
        let first = !tables
            .addresses
            .values()
            .any(|other| other.owner == address.owner);

        let mut stored = address.clone();
        stored.is_default = first || address.is_default;
        if stored.is_default {
            tables.clear_default(stored.owner, stored.id);
        }
        tables.addresses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, address: &Address) -> RepositoryResult<Address> {
        let mut tables = self.tables.write().await;
        let was_default = match tables.addresses.get(&address.id) {
            Some(stored) if stored.owner == address.owner => stored.is_default,
            _ => return Err(RepositoryError::NotFound(format!("Address {}", address.id))),
        };
        if address.is_default {
            tables.clear_default(address.owner, address.id);
        }
        let mut stored = address.clone();
        stored.is_default = was_default || address.is_default;
        tables.addresses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn set_default(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .addresses
            .get(&id)
            .is_some_and(|address| address.owner == owner);
        if !exists {
            return Err(RepositoryError::NotFound(format!("Address {}", id)));
        }
        tables.clear_default(owner, id);
        if let Some(address) = tables.addresses.get_mut(&id) {
            address.is_default = true;
        }
        Ok(())
    }

    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Uuid>> {
        let mut tables = self.tables.write().await;
        let removed = match tables.addresses.get(&id) {
            Some(address) if address.owner == owner => tables.addresses.remove(&id),
            _ => None,
        }
        .ok_or_else(|| RepositoryError::NotFound(format!("Address {}", id)))?;

        if !removed.is_default {
            return Ok(None);
        }
        let newest = tables
            .addresses
            .values_mut()
            .filter(|address| address.owner == owner)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(newest.map(|address| {
            address.is_default = true;
            address.id
        }))
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn list(&self, owner: PartyRef) -> RepositoryResult<Vec<Contact>> {
        let tables = self.tables.read().await;
        let mut contacts: Vec<Contact> = tables
            .contacts
            .values()
            .filter(|contact| contact.owner == owner)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| {
            a.last_name
                .to_lowercase()
                .cmp(&b.last_name.to_lowercase())
                .then(a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
                .then(a.id.cmp(&b.id))
        });
        Ok(contacts)
    }

    async fn find_by_id(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .get(&id)
            .filter(|contact| contact.owner == owner)
            .cloned())
    }

    async fn create(&self, contact: &Contact) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.owner_exists(contact.owner) {
            return Err(RepositoryError::NotFound(contact.owner.to_string()));
        }
        tables.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn update(&self, contact: &Contact) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.contacts.get_mut(&contact.id) {
            Some(stored) if stored.owner == contact.owner => {
                *stored = contact.clone();
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Contact {}", contact.id))),
        }
    }

    async fn delete(&self, owner: PartyRef, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.contacts.get(&id) {
            Some(contact) if contact.owner == owner => {
                tables.contacts.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Contact {}", id))),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create(&self, product: &Product) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_product(product)?;
        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .products
            .get(&product.id)
            .is_some_and(|stored| stored.organization_id == product.organization_id);
        if !exists {
            return Err(RepositoryError::NotFound(format!("Product {}", product.id)));
        }
        tables.check_product(product)?;
        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .get(&id)
            .filter(|product| product.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_reference(
        &self,
        organization_id: Uuid,
        reference: &str,
    ) -> RepositoryResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .find(|product| {
                product.organization_id == organization_id && product.reference == reference
            })
            .cloned())
    }

    async fn list(
        &self,
        organization_id: Uuid,
        filter: &ProductFilter,
    ) -> RepositoryResult<Page<Product>> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|product| product.organization_id == organization_id && filter.matches(product))
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            let ordering = match filter.sort {
                ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                ProductSort::Reference => a.reference.cmp(&b.reference),
                ProductSort::UnitPrice => a.unit_price.cmp(&b.unit_price),
                ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(ordering, filter.direction).then(a.id.cmp(&b.id))
        });
        Ok(Page::from_sorted(products, filter.page))
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.products.get(&id) {
            Some(product) if product.organization_id == organization_id => {
                tables.products.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Product {}", id))),
        }
    }
}

#[async_trait]
impl ProductCategoryRepository for InMemoryStore {
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<ProductCategory>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<ProductCategory> = tables
            .categories
            .values()
            .filter(|category| category.organization_id == organization_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(categories)
    }

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<ProductCategory>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .get(&id)
            .filter(|category| category.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> RepositoryResult<Option<ProductCategory>> {
        let name = name.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|category| {
                category.organization_id == organization_id && category.name.to_lowercase() == name
            })
            .cloned())
    }

    async fn create(&self, category: &ProductCategory) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_category_unique(category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &ProductCategory) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let exists = tables
            .categories
            .get(&category.id)
            .is_some_and(|stored| stored.organization_id == category.organization_id);
        if !exists {
            return Err(RepositoryError::NotFound(format!("Product category {}", category.id)));
        }
        tables.check_category_unique(category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.categories.get(&id) {
            Some(category) if category.organization_id == organization_id => {
                tables.categories.remove(&id);
            }
            _ => return Err(RepositoryError::NotFound(format!("Product category {}", id))),
        }
        let now = Utc::now();
        for product in tables.products.values_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
                product.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FiscalYearRepository for InMemoryStore {
    async fn list(&self, organization_id: Uuid) -> RepositoryResult<Vec<FiscalYear>> {
        let tables = self.tables.read().await;
        let mut fiscal_years: Vec<FiscalYear> = tables
            .fiscal_years
            .values()
            .filter(|fiscal_year| fiscal_year.organization_id == organization_id)
            .cloned()
            .collect();
        fiscal_years.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(fiscal_years)
    }

    async fn find_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepositoryResult<Option<FiscalYear>> {
        let tables = self.tables.read().await;
        Ok(tables
            .fiscal_years
            .get(&id)
            .filter(|fiscal_year| fiscal_year.organization_id == organization_id)
            .cloned())
    }

    async fn find_overlapping(
        &self,
        organization_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> RepositoryResult<Vec<FiscalYear>> {
        let tables = self.tables.read().await;
        let mut overlapping: Vec<FiscalYear> = tables
            .fiscal_years
            .values()
            .filter(|fiscal_year| {
                fiscal_year.organization_id == organization_id
                    && Some(fiscal_year.id) != exclude
                    && fiscal_year.overlaps(start_date, end_date)
            })
            .cloned()
            .collect();
        overlapping.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(overlapping)
    }

    async fn create(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()> {
        self.tables
            .write()
            .await
            .fiscal_years
            .insert(fiscal_year.id, fiscal_year.clone());
        Ok(())
    }

    async fn update(&self, fiscal_year: &FiscalYear) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.fiscal_years.get_mut(&fiscal_year.id) {
            Some(stored) if stored.organization_id == fiscal_year.organization_id => {
                *stored = fiscal_year.clone();
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Fiscal year {}", fiscal_year.id))),
        }
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        match tables.fiscal_years.get(&id) {
            Some(fiscal_year) if fiscal_year.organization_id == organization_id => {
                tables.fiscal_years.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(format!("Fiscal year {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::AddressInput;
    use crate::domain::client::ClientInput;
    use chrono::Duration;

    fn client(organization_id: Uuid, name: &str, email: Option<&str>) -> Client {
        let fields = ClientInput {
            name: name.to_string(),
            email: email.map(str::to_string),
            ..Default::default()
        }
        .validate()
        .unwrap();
        Client::new(organization_id, fields)
    }

    fn address(owner: PartyRef, city: &str, is_default: bool) -> Address {
        let fields = AddressInput {
            line1: "1 rue de la Paix".to_string(),
            postal_code: "75002".to_string(),
            city: city.to_string(),
            is_default,
            ..Default::default()
        }
        .validate()
        .unwrap();
        Address::new(owner, fields)
    }

    #[tokio::test]
    async fn duplicate_client_email_is_a_conflict() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        ClientRepository::create(&store, &client(org, "A", Some("a@exemple.fr")))
            .await
            .unwrap();

        let result =
            ClientRepository::create(&store, &client(org, "B", Some("A@Exemple.fr"))).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        // another organization may reuse it
        ClientRepository::create(&store, &client(Uuid::new_v4(), "C", Some("a@exemple.fr")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn first_address_becomes_default() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let owner_client = client(org, "A", None);
        ClientRepository::create(&store, &owner_client).await.unwrap();
        let owner = PartyRef::Client(owner_client.id);

        let first = AddressRepository::create(&store, &address(owner, "Paris", false))
            .await
            .unwrap();
        assert!(first.is_default);

        let second = AddressRepository::create(&store, &address(owner, "Lyon", true))
            .await
            .unwrap();
        let listed = AddressRepository::list(&store, owner).await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed.iter().filter(|a| a.is_default).count(), 1);
    }

    #[tokio::test]
    async fn deleting_default_promotes_newest_remaining() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let owner_client = client(org, "A", None);
        ClientRepository::create(&store, &owner_client).await.unwrap();
        let owner = PartyRef::Client(owner_client.id);

        let default = AddressRepository::create(&store, &address(owner, "Paris", true))
            .await
            .unwrap();
        let mut older = address(owner, "Lyon", false);
        older.created_at = default.created_at - Duration::days(2);
        let mut newer = address(owner, "Nantes", false);
        newer.created_at = default.created_at - Duration::days(1);
        AddressRepository::create(&store, &older).await.unwrap();
        AddressRepository::create(&store, &newer).await.unwrap();

        let promoted = AddressRepository::delete(&store, owner, default.id)
            .await
            .unwrap();
        assert_eq!(promoted, Some(newer.id));
    }

    #[tokio::test]
    async fn stale_edit_keeps_promoted_default() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let owner_client = client(org, "A", None);
        ClientRepository::create(&store, &owner_client).await.unwrap();
        let owner = PartyRef::Client(owner_client.id);

        let default = AddressRepository::create(&store, &address(owner, "Paris", true))
            .await
            .unwrap();
        let other = AddressRepository::create(&store, &address(owner, "Lyon", false))
            .await
            .unwrap();
        let mut edited = other.clone();
        edited.city = "Lille".to_string();

        let promoted = AddressRepository::delete(&store, owner, default.id)
            .await
            .unwrap();
        assert_eq!(promoted, Some(other.id));

        let saved = AddressRepository::update(&store, &edited).await.unwrap();
        assert!(saved.is_default);
        assert_eq!(saved.city, "Lille");
        let listed = AddressRepository::list(&store, owner).await.unwrap();
        assert_eq!(listed.iter().filter(|a| a.is_default).count(), 1);
    }

    #[tokio::test]
    async fn deleting_client_drops_its_addresses() {
        let store = InMemoryStore::new();
        let org = Uuid::new_v4();
        let owner_client = client(org, "A", None);
        ClientRepository::create(&store, &owner_client).await.unwrap();
        let owner = PartyRef::Client(owner_client.id);
        AddressRepository::create(&store, &address(owner, "Paris", false))
            .await
            .unwrap();

        ClientRepository::delete(&store, org, owner_client.id)
            .await
            .unwrap();
        assert!(AddressRepository::list(&store, owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn address_for_unknown_owner_is_not_found() {
        let store = InMemoryStore::new();
        let result = AddressRepository::create(
            &store,
            &address(PartyRef::Supplier(Uuid::new_v4()), "Paris", false),
        )
        .await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
