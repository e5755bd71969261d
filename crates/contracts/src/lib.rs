//! Domain contracts shared by the store backend: aggregates, form DTOs and
//! the validation, pagination and messaging primitives they rely on.

pub mod domain;
pub mod shared;
