pub mod request_logger;
pub mod security_headers;

pub use request_logger::request_logger;
pub use security_headers::security_headers;
