//! Utility functions and helpers.

pub mod console;
pub mod http;
pub mod url;

pub use self::url::{get_host, normalize, resolve_link};
