// Repository ports: the domain's view of persistence
// Implemented by infrastructure adapters (PostgreSQL, in-memory)

pub mod address_repository;
pub mod client_repository;
pub mod contact_repository;
pub mod error;
pub mod fiscal_year_repository;
pub mod member_repository;
pub mod organization_repository;
pub mod product_repository;
pub mod supplier_repository;
pub mod user_repository;

pub use address_repository::AddressRepository;
pub use client_repository::ClientRepository;
pub use contact_repository::ContactRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use fiscal_year_repository::FiscalYearRepository;
pub use member_repository::MemberRepository;
pub use organization_repository::OrganizationRepository;
pub use product_repository::{ProductCategoryRepository, ProductRepository};
pub use supplier_repository::SupplierRepository;
pub use user_repository::UserRepository;
