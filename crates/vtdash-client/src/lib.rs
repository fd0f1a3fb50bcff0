//! vtdash-client: read-only access to the VTAdmin HTTP API.
//!
//! Provides a transport-agnostic `ApiClient` trait with implementations for:
//! - `HttpApiClient`: GET requests against a fixed base URL
//! - `MockApiClient`: canned responses and call recording for tests
//!
//! Both normalize every failure (transport, status, decode) into `FetchError`.

pub mod client;
pub mod error;
pub mod http;
pub mod mock;

pub use client::{decode_payload, decode_response, unwrap_envelope, ApiClient};
pub use error::FetchError;
pub use http::HttpApiClient;
pub use mock::MockApiClient;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "vtdash-client"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "vtdash-client");
    }
}
