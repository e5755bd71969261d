pub mod messages;
pub mod pagination;
pub mod validation;
