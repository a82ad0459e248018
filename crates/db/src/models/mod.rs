//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` payload DTO mirroring the JSON request body
//! - A validated DTO handed to the repository layer

pub mod group;
pub mod pet;
pub mod traits;
