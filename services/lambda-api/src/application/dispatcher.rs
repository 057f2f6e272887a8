/// ディスパッチャー
///
/// 正規化・ルートマッチ・ハンドラー呼び出し・レスポンス構築をつなぐ
/// トップレベルのエントリポイント。
///
/// # 処理フロー
/// 1. 生イベントを`ApiRequest`に正規化
/// 2. ルートをマッチング
///    - ルートなし: キャッチオールハンドラー（デフォルト404）
///    - ルートはあるがメソッドのハンドラーなし: 405
/// 3. パスパラメーターを設定してハンドラーを呼び出し
/// 4. ハンドラーの失敗（エラー・panic）はエラーハンドラーへ委譲
///    - エラーハンドラー自身の失敗はログ出力して固定の500
///
/// `dispatch`は失敗せず、常にワイヤー形式のレスポンスを返す。
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, info_span, Instrument};

use crate::application::handler::{DefaultErrorHandler, ErrorHandler, NotFoundHandler, RouteHandler};
use crate::application::request_normalizer::normalize;
use crate::application::response_builder::build_response;
use crate::application::route_table::{MethodRoutes, RouteTable};
use crate::domain::{
    ApiRequest, ApiResponse, CookiePolicy, DispatchError, HttpMethod, InvocationContext, RawEvent,
    WireResponse,
};

/// ルートはあるがメソッドのハンドラーがない場合のレスポンス
///
/// `Allow`ヘッダーにはルートで受け付けるメソッドを列挙する。
fn method_not_allowed(methods: &MethodRoutes) -> ApiResponse {
    let allow = methods
        .allowed_methods()
        .iter()
        .map(HttpMethod::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    ApiResponse::text(405, "Method not allowed").with_header("Allow", allow)
}

/// エラーハンドラーが失敗した場合の固定レスポンス
fn internal_server_error() -> ApiResponse {
    ApiResponse::text(500, "Internal server error")
}

/// リクエストディスパッチャー
///
/// 構築後は不変で、複数の呼び出しから`Arc`経由で共有できる。
pub struct Dispatcher {
    routes: RouteTable,
    error_handler: Arc<dyn ErrorHandler>,
    catch_all: Arc<dyn RouteHandler>,
    cookie_policy: CookiePolicy,
}

impl Dispatcher {
    /// ルートテーブルからディスパッチャーを作成
    ///
    /// エラーハンドラー・キャッチオール・Cookie属性はデフォルトを使用する。
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            error_handler: Arc::new(DefaultErrorHandler),
            catch_all: Arc::new(NotFoundHandler),
            cookie_policy: CookiePolicy::default(),
        }
    }

    /// Cookie属性を環境変数から読み込んでディスパッチャーを作成
    pub fn from_env(routes: RouteTable) -> Self {
        Self::new(routes).with_cookie_policy(CookiePolicy::from_env())
    }

    pub fn with_error_handler(mut self, error_handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    pub fn with_catch_all(mut self, catch_all: impl RouteHandler + 'static) -> Self {
        self.catch_all = Arc::new(catch_all);
        self
    }

    pub fn with_cookie_policy(mut self, cookie_policy: CookiePolicy) -> Self {
        self.cookie_policy = cookie_policy;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// 生イベントを処理してワイヤー形式のレスポンスを返す
    pub async fn dispatch(&self, event: &RawEvent, context: &InvocationContext) -> WireResponse {
        let span = info_span!(
            "dispatch",
            request_id = %context.request_id,
            function_name = %context.function_name,
            function_version = %context.function_version,
        );

        async {
            info!(
                function_name = %context.function_name,
                function_version = %context.function_version,
                "リクエスト受信"
            );

            let request = normalize(event);
            let method = request.method.clone();
            let path = request.path.clone();

            let response = self.respond(request).await;
            let wire = build_response(response, &self.cookie_policy);

            info!(
                method = %method,
                path = %path,
                status_code = wire.status_code,
                "レスポンス送信"
            );
            wire
        }
        .instrument(span)
        .await
    }

    /// 正規化済みリクエストをルーティングしてハンドラーのレスポンスを返す
    ///
    /// ワイヤー形式への変換は行わない（HTTPアダプターやテストから直接使う）。
    pub async fn respond(&self, mut request: ApiRequest) -> ApiResponse {
        let Some(matched) = self.routes.find(&request.path) else {
            debug!(path = %request.path, "ルートなし、キャッチオールへ委譲");
            return self.invoke(self.catch_all.as_ref(), &request).await;
        };

        let Some(handler) = matched.route.handler_for(&request.method) else {
            debug!(
                method = %request.method,
                pattern = matched.pattern,
                "メソッドに対応するハンドラーなし"
            );
            return method_not_allowed(matched.route);
        };

        debug!(pattern = matched.pattern, "ルートにマッチ");
        request.path_parameters = matched.path_parameters;
        self.invoke(handler.as_ref(), &request).await
    }

    /// ハンドラーを呼び出す（外側のエラー境界）
    async fn invoke(&self, handler: &dyn RouteHandler, request: &ApiRequest) -> ApiResponse {
        let result = AssertUnwindSafe(handler.handle(request)).catch_unwind().await;

        let error = match result {
            Ok(Ok(response)) => return response,
            Ok(Err(err)) => DispatchError::Handler(err),
            Err(payload) => DispatchError::from_panic(payload),
        };

        self.handle_error(request, error).await
    }

    /// エラーハンドラーを呼び出す（内側のエラー境界）
    ///
    /// エラーハンドラーが失敗・panicした場合も固定の500を返し、失敗しない。
    async fn handle_error(&self, request: &ApiRequest, error: DispatchError) -> ApiResponse {
        let result = AssertUnwindSafe(self.error_handler.handle_error(request, &error))
            .catch_unwind()
            .await;

        let handler_failure = match result {
            Ok(Ok(response)) => return response,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => DispatchError::from_panic(payload).to_string(),
        };

        error!(
            method = %request.method,
            path = %request.path,
            error = %error,
            error_handler_error = %handler_failure,
            "エラーハンドラーが失敗"
        );
        internal_server_error()
    }
}

impl Default for Dispatcher {
    /// `GET /ping`のみを持つディスパッチャー
    fn default() -> Self {
        Self::new(RouteTable::ping())
    }
}
