pub mod client;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiError, StudyApi, User};
pub use transport::{Body, HttpTransport, Method, Response, Transport, TransportError};
