// HTTP adapters: each handler extracts the session and input, then delegates
// to the matching action and wraps the result in an envelope

use uuid::Uuid;

use crate::domain::address::PartyRef;

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

/// Selects which kind of party a nested route belongs to
pub trait Party: Send + Sync + 'static {
    fn reference(id: Uuid) -> PartyRef;
}

/// Routes under `/clients/:client_id`
pub struct ClientParty;

impl Party for ClientParty {
    fn reference(id: Uuid) -> PartyRef {
        PartyRef::Client(id)
    }
}

/// Routes under `/suppliers/:supplier_id`
pub struct SupplierParty;

impl Party for SupplierParty {
    fn reference(id: Uuid) -> PartyRef {
        PartyRef::Supplier(id)
    }
}
