//! Domain rules for the pet registry.
//!
//! This crate has no I/O: it holds shared types, the error taxonomy, field
//! validation rules and page-number pagination math so that both the
//! repository layer and the HTTP layer agree on them.

pub mod error;
pub mod pagination;
pub mod pet;
pub mod types;
pub mod validation;
