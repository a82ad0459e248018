//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods suffixed `_inner`
//! run inside a caller-owned transaction.

pub mod group_repo;
pub mod pet_repo;
pub mod trait_repo;

pub use group_repo::GroupRepo;
pub use pet_repo::PetRepo;
pub use trait_repo::TraitRepo;
