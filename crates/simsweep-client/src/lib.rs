//! HTTP client for the simsweep duplicate detection backend.
//!
//! The terminal client talks to the backend only through the [`Backend`]
//! trait; [`HttpBackend`] is the production implementation.

mod backend;
mod error;
pub mod http;

pub use backend::Backend;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
