// Lambdaランタイムのコンテキストから実行コンテキストへの変換

use lambda_runtime::Context;

use crate::domain::InvocationContext;

impl From<&Context> for InvocationContext {
    /// 空の項目（ローカル実行時など）は`InvocationContext::local()`の値で補う
    fn from(ctx: &Context) -> Self {
        let local = InvocationContext::local();
        let or_local = |value: &str, fallback: String| {
            if value.is_empty() {
                fallback
            } else {
                value.to_string()
            }
        };

        Self {
            request_id: or_local(&ctx.request_id, local.request_id),
            function_name: or_local(&ctx.env_config.function_name, local.function_name),
            function_version: or_local(&ctx.env_config.version, local.function_version),
        }
    }
}
