/// 実行コンテキスト
///
/// 1回のLambda呼び出しを識別する情報。ログ出力にのみ使用する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// 呼び出しごとのリクエストID
    pub request_id: String,
    /// 実行中の関数名
    pub function_name: String,
    /// 実行中の関数バージョン
    pub function_version: String,
}

impl InvocationContext {
    pub fn new(
        request_id: impl Into<String>,
        function_name: impl Into<String>,
        function_version: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            function_name: function_name.into(),
            function_version: function_version.into(),
        }
    }

    /// Lambda外（ローカル実行・テスト）向けのコンテキスト
    pub fn local() -> Self {
        Self::new("local", "lambda-api", env!("CARGO_PKG_VERSION"))
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::local()
    }
}
