//! Request/response pipeline shared by all page handlers.
//!
//! A handler extracts a [`ViewContext`], does its work and returns a
//! [`ViewOutcome`]; [`render`] turns that into the page or AJAX response.

pub mod context;
pub mod flash;
pub mod render;

pub use context::{is_ajax, ViewContext};
pub use render::{render, ViewOutcome};
