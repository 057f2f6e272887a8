/// API Gateway REST API（プロキシ統合）エントリポイント
///
/// プロキシ統合イベントをそのまま受け取り、ディスパッチャーでルーティングして
/// `statusCode`/`headers`/`multiValueHeaders`/`body`形式のレスポンスを返す。
///
/// Cookie属性は環境変数（COOKIE_MAX_AGE_DAYS等）から読み込む。
use lambda_api::application::{Dispatcher, RouteTable};
use lambda_api::domain::{InvocationContext, RawEvent, WireResponse};
use lambda_api::infrastructure::init_logging;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use tokio::sync::OnceCell;
use tracing::info;

/// ディスパッチャーの静的インスタンス
///
/// warm start時は初期化済みのルートテーブル・Cookie設定を再利用する。
static DISPATCHER: OnceCell<Dispatcher> = OnceCell::const_new();

async fn get_dispatcher() -> &'static Dispatcher {
    DISPATCHER
        .get_or_init(|| async {
            let dispatcher = Dispatcher::from_env(RouteTable::ping());
            info!(
                routes = ?dispatcher.routes().patterns().collect::<Vec<_>>(),
                "ディスパッチャーを初期化"
            );
            dispatcher
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    lambda_runtime::run(service_fn(handler)).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// ディスパッチは失敗しないため、常に`Ok`を返す。
async fn handler(event: LambdaEvent<RawEvent>) -> Result<WireResponse, Error> {
    let (payload, context) = event.into_parts();
    let context = InvocationContext::from(&context);

    Ok(get_dispatcher().await.dispatch(&payload, &context).await)
}
