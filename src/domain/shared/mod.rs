// Building blocks shared by every aggregate:
// form validation, pagination, lifecycle status, French identifiers

pub mod pagination;
pub mod status;
pub mod validation;
pub mod value_objects;

pub use pagination::{Page, PageRequest, SortDirection};
pub use status::{LifecycleStatus, StatusInput};
pub use validation::FieldErrors;
