//! Administrative backend of a cosmetics store: the company profile and the
//! worker, product and supplier catalogs.

pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
