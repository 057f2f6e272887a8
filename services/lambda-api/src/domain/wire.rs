// ワイヤー形式
//
// ホスト実行環境（API Gateway REST API プロキシ統合など）と
// やり取りするリクエスト/レスポンスのJSON形状。

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Set-Cookieヘッダー名（multiValueHeadersのキー）
pub const SET_COOKIE_HEADER: &str = "Set-Cookie";

/// 受信イベント
///
/// API Gateway REST API プロキシ統合のイベントをそのままデシリアライズできる。
/// ヘッダー・クエリのマップ自体がnullの場合や、値がnullの場合も受け付ける。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, alias = "method")]
    pub http_method: Option<String>,
    #[serde(default, alias = "rawPath")]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, Option<String>>>,
    #[serde(default, alias = "query")]
    pub query_string_parameters: Option<HashMap<String, Option<String>>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// 送信レスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    /// 単一ヘッダーで複数値を表現できないもの（Set-Cookie）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_headers: Option<BTreeMap<String, Vec<String>>>,
}

impl WireResponse {
    /// Set-Cookieの値一覧を取得（なければ空）
    pub fn set_cookies(&self) -> &[String] {
        self.multi_value_headers
            .as_ref()
            .and_then(|headers| headers.get(SET_COOKIE_HEADER))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// ヘッダー値を大文字小文字を区別せずに取得
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
