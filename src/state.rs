// Shared application state handed to every handler and action

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::domain::repositories::{
    AddressRepository, ClientRepository, ContactRepository, FiscalYearRepository,
    MemberRepository, OrganizationRepository, ProductCategoryRepository, ProductRepository,
    SupplierRepository, UserRepository,
};
use crate::infrastructure::cache::TagCache;
use crate::infrastructure::repositories::{
    InMemoryStore, PostgresAddressRepository, PostgresClientRepository,
    PostgresContactRepository, PostgresFiscalYearRepository, PostgresMemberRepository,
    PostgresOrganizationRepository, PostgresProductRepository, PostgresSupplierRepository,
    PostgresUserRepository,
};

/// Repository ports, behind trait objects so the backend is chosen at startup
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub suppliers: Arc<dyn SupplierRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn ProductCategoryRepository>,
    pub fiscal_years: Arc<dyn FiscalYearRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let products = Arc::new(PostgresProductRepository::new(pool.clone()));
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            organizations: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
            members: Arc::new(PostgresMemberRepository::new(pool.clone())),
            clients: Arc::new(PostgresClientRepository::new(pool.clone())),
            suppliers: Arc::new(PostgresSupplierRepository::new(pool.clone())),
            addresses: Arc::new(PostgresAddressRepository::new(pool.clone())),
            contacts: Arc::new(PostgresContactRepository::new(pool.clone())),
            products: products.clone(),
            categories: products,
            fiscal_years: Arc::new(PostgresFiscalYearRepository::new(pool)),
        }
    }

    /// Every port backed by one shared in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            organizations: store.clone(),
            members: store.clone(),
            clients: store.clone(),
            suppliers: store.clone(),
            addresses: store.clone(),
            contacts: store.clone(),
            products: store.clone(),
            categories: store.clone(),
            fiscal_years: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub cache: TagCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repositories: Repositories, config: Config) -> Self {
        Self {
            repositories,
            cache: TagCache::new(config.cache_ttl, config.cache_max_entries),
            config: Arc::new(config),
        }
    }

    /// In-memory state with test configuration
    pub fn in_memory() -> Self {
        Self::new(Repositories::in_memory(), Config::for_tests())
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
