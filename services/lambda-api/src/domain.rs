// Domain layer modules
pub mod cookie_policy;
pub mod dispatch_error;
pub mod http_method;
pub mod invocation_context;
pub mod request;
pub mod response;
pub mod route_matcher;
pub mod wire;

// Re-exports
pub use cookie_policy::{CookiePolicy, SameSite};
pub use dispatch_error::{BoxError, DispatchError};
pub use http_method::{HttpMethod, UnknownMethodError};
pub use invocation_context::InvocationContext;
pub use request::{ApiRequest, RequestBody};
pub use response::{ApiResponse, ResponseBody};
pub use route_matcher::{match_route, RouteMatch};
pub use wire::{RawEvent, WireResponse, SET_COOKIE_HEADER};
