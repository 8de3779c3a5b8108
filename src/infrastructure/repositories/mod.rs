// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_address_repository;
pub mod postgres_client_repository;
pub mod postgres_contact_repository;
pub mod postgres_fiscal_year_repository;
pub mod postgres_member_repository;
pub mod postgres_organization_repository;
pub mod postgres_product_repository;
pub mod postgres_supplier_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryStore;
pub use postgres_address_repository::PostgresAddressRepository;
pub use postgres_client_repository::PostgresClientRepository;
pub use postgres_contact_repository::PostgresContactRepository;
pub use postgres_fiscal_year_repository::PostgresFiscalYearRepository;
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_organization_repository::PostgresOrganizationRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_supplier_repository::PostgresSupplierRepository;
pub use postgres_user_repository::PostgresUserRepository;
