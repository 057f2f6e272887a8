// Infrastructure layer modules
pub mod http_adapter;
pub mod lambda_context;
pub mod logging;

// Re-exports
pub use http_adapter::{from_http_request, internal_server_error, into_http_response, HttpAdapterError};
pub use logging::init_logging;

#[cfg(test)]
pub use logging::init_test_logging;
