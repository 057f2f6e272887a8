/// Lambda Function URL / API Gateway HTTP API エントリポイント
///
/// lambda_httpが受けたHTTPリクエストを生イベントに詰め替えてディスパッチし、
/// 結果をHTTPレスポンスに戻す。
use lambda_api::application::{Dispatcher, RouteTable};
use lambda_api::domain::InvocationContext;
use lambda_api::infrastructure::{
    from_http_request, init_logging, internal_server_error, into_http_response,
};
use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tokio::sync::OnceCell;
use tracing::{error, info};

static DISPATCHER: OnceCell<Dispatcher> = OnceCell::const_new();

async fn get_dispatcher() -> &'static Dispatcher {
    DISPATCHER
        .get_or_init(|| async { Dispatcher::from_env(RouteTable::ping()) })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("HTTP Lambda関数を初期化");

    run(service_fn(handler)).await
}

/// HTTPリクエストハンドラー
///
/// ハンドラーが変換できないヘッダー等を返した場合は、ログ出力して500を返す。
async fn handler(request: Request) -> Result<Response<Body>, Error> {
    let context = request
        .lambda_context_ref()
        .map(InvocationContext::from)
        .unwrap_or_default();
    let event = from_http_request(&request);

    let wire = get_dispatcher().await.dispatch(&event, &context).await;

    match into_http_response(wire) {
        Ok(response) => Ok(response),
        Err(e) => {
            error!(request_id = %context.request_id, error = %e, "レスポンス変換エラー");
            Ok(internal_server_error())
        }
    }
}
