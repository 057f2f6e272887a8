// ハンドラートレイト
//
// アプリケーションが登録するルートハンドラー・エラーハンドラーの境界と、
// ディスパッチャーが使うデフォルト実装。

use std::future::Future;

use async_trait::async_trait;
use tracing::error;

use crate::domain::{ApiRequest, ApiResponse, BoxError, DispatchError};

/// ルートハンドラー
///
/// 正規化済みリクエスト（パスパラメーター設定済み）を受け取りレスポンスを返す。
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, BoxError>;
}

/// エラーハンドラー
///
/// ルートハンドラーが失敗した場合に、利用者に返すレスポンスを決定する。
/// エラーハンドラー自身が失敗した場合はディスパッチャーが固定の500を返す。
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn handle_error(
        &self,
        request: &ApiRequest,
        error: &DispatchError,
    ) -> Result<ApiResponse, BoxError>;
}

/// クロージャをルートハンドラーとして扱うアダプター
pub struct HandlerFn<F> {
    f: F,
}

/// 非同期クロージャからルートハンドラーを作成
///
/// クロージャにはリクエストの複製が渡される。
///
/// # 例
/// ```
/// use lambda_api::application::handler_fn;
/// use lambda_api::domain::{ApiResponse, BoxError};
///
/// let handler = handler_fn(|request| async move {
///     let id = request.path_parameter("id").unwrap_or_default().to_string();
///     Ok::<_, BoxError>(ApiResponse::text(200, id))
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, BoxError>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> RouteHandler for HandlerFn<F>
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, BoxError>> + Send + 'static,
{
    async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, BoxError> {
        (self.f)(request.clone()).await
    }
}

/// クロージャをエラーハンドラーとして扱うアダプター
pub struct ErrorHandlerFn<F> {
    f: F,
}

/// 非同期クロージャからエラーハンドラーを作成
///
/// クロージャにはリクエストの複製とエラーメッセージが渡される。
pub fn error_handler_fn<F, Fut>(f: F) -> ErrorHandlerFn<F>
where
    F: Fn(ApiRequest, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, BoxError>> + Send + 'static,
{
    ErrorHandlerFn { f }
}

#[async_trait]
impl<F, Fut> ErrorHandler for ErrorHandlerFn<F>
where
    F: Fn(ApiRequest, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, BoxError>> + Send + 'static,
{
    async fn handle_error(
        &self,
        request: &ApiRequest,
        error: &DispatchError,
    ) -> Result<ApiResponse, BoxError> {
        (self.f)(request.clone(), error.to_string()).await
    }
}

// ===========================================
// デフォルト実装
// ===========================================

/// `/ping`へのGETに`pong`を返すハンドラー（デフォルトのルートテーブル用）
pub struct PingHandler;

#[async_trait]
impl RouteHandler for PingHandler {
    async fn handle(&self, _request: &ApiRequest) -> Result<ApiResponse, BoxError> {
        Ok(ApiResponse::text(200, "pong"))
    }
}

/// どのルートにもマッチしなかった場合のハンドラー（404）
pub struct NotFoundHandler;

#[async_trait]
impl RouteHandler for NotFoundHandler {
    async fn handle(&self, _request: &ApiRequest) -> Result<ApiResponse, BoxError> {
        Ok(ApiResponse::text(404, "Not found"))
    }
}

/// デフォルトのエラーハンドラー
///
/// メソッド・パス・エラー内容をログ出力し、汎用的な500を返す。
/// エラーの詳細はレスポンスに含めない。
pub struct DefaultErrorHandler;

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
    async fn handle_error(
        &self,
        request: &ApiRequest,
        error: &DispatchError,
    ) -> Result<ApiResponse, BoxError> {
        error!(
            method = %request.method,
            path = %request.path,
            error = %error,
            "ハンドラーエラー"
        );
        Ok(ApiResponse::text(500, "Internal server error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResponseBody;
    use crate::infrastructure::init_test_logging;

    fn request(path: &str) -> ApiRequest {
        ApiRequest {
            method: "GET".to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_handler_fn_receives_request() {
        let handler = handler_fn(|request: ApiRequest| async move {
            Ok::<_, BoxError>(ApiResponse::text(200, format!("{} {}", request.method, request.path)))
        });

        let response = handler.handle(&request("/items")).await.unwrap();
        assert_eq!(response.body, Some(ResponseBody::Text("GET /items".to_string())));
    }

    #[tokio::test]
    async fn test_handler_fn_propagates_error() {
        let handler = handler_fn(|_request: ApiRequest| async move {
            Err::<ApiResponse, BoxError>("storage offline".into())
        });

        let error = handler.handle(&request("/")).await.unwrap_err();
        assert_eq!(error.to_string(), "storage offline");
    }

    #[tokio::test]
    async fn test_error_handler_fn_receives_message() {
        let handler = error_handler_fn(|request: ApiRequest, message: String| async move {
            Ok::<_, BoxError>(ApiResponse::text(503, format!("{}: {message}", request.path)))
        });

        let error = DispatchError::Handler("timeout".into());
        let response = handler.handle_error(&request("/slow"), &error).await.unwrap();
        assert_eq!(response.status_code, Some(503));
        assert_eq!(
            response.body,
            Some(ResponseBody::Text("/slow: handler failed: timeout".to_string()))
        );
    }

    #[tokio::test]
    async fn test_default_handlers() {
        init_test_logging();

        let ping = PingHandler.handle(&request("/ping")).await.unwrap();
        assert_eq!(ping, ApiResponse::text(200, "pong"));

        let not_found = NotFoundHandler.handle(&request("/nope")).await.unwrap();
        assert_eq!(not_found, ApiResponse::text(404, "Not found"));

        let error = DispatchError::Panic("boom".to_string());
        let internal = DefaultErrorHandler
            .handle_error(&request("/boom"), &error)
            .await
            .unwrap();
        assert_eq!(internal, ApiResponse::text(500, "Internal server error"));
    }
}
