// アプリケーション層モジュール
pub mod dispatcher;
pub mod handler;
pub mod request_normalizer;
pub mod response_builder;
pub mod route_table;

// 再エクスポート
pub use dispatcher::Dispatcher;
pub use handler::{
    error_handler_fn, handler_fn, DefaultErrorHandler, ErrorHandler, ErrorHandlerFn, HandlerFn,
    NotFoundHandler, PingHandler, RouteHandler,
};
pub use request_normalizer::{
    normalize, normalize_headers, normalize_path, normalize_query, parse_body, parse_cookie,
};
pub use response_builder::{build_response, build_response_at, set_cookie_value};
pub use route_table::{MethodRoutes, RouteTable};
