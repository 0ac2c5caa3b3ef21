//! Model system — entity-facing facade over the query builder and session
//! manager
//!
//! - `core_trait`: the `Model` trait (schema metadata, row/field conversion,
//!   validation hook)
//! - `crud`: create/update/delete operations and their bulk variants
//! - `selects`: read operations, joins, counting, pagination
//! - `extensions`: primary-key lookups, `apply`, and scoped transactions
//! - `serialize`: document/JSON output with relationship expansion

pub mod core_trait;
pub mod crud;
pub mod extensions;
pub mod selects;
pub mod serialize;

pub use core_trait::{FieldMap, Model};
pub use crud::CrudOperations;
pub use extensions::ModelExtensions;
pub use selects::{QueryMethods, SelectOptions};
pub use serialize::ModelDocument;
