//! Generic list/detail/create/update/delete flow shared by every catalog
//! aggregate. Storage goes through [`CrudRepository`], form cleaning through
//! `AggregateForm`, and [`CrudController`] ties the two together.

pub mod controller;
pub mod error;
pub mod repository;
pub mod search;

pub use controller::{CrudController, ListQuery};
pub use error::{unique_violation, CrudError, RepositoryError};
pub use repository::CrudRepository;
