/// ハンドラーが返すレスポンス
///
/// レスポンスビルダーがワイヤー形式に変換する前の値。
/// ステータスコード未設定時は200として扱う。
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// レスポンスボディ
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// そのまま返却するテキスト（Content-Type未設定時はtext/plain）
    Text(String),
    /// JSON文字列にシリアライズする構造化値
    Json(Value),
}

/// ハンドラーのレスポンス
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    /// HTTPステータスコード（Noneの場合は200）
    pub status_code: Option<u16>,
    pub headers: BTreeMap<String, String>,
    /// Cookie（空文字の値は削除を意味する）
    pub cookies: BTreeMap<String, String>,
    pub body: Option<ResponseBody>,
}

impl ApiResponse {
    /// 空のレスポンス（200、ボディなし）
    pub fn new() -> Self {
        Self::default()
    }

    /// テキストボディのレスポンスを作成
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            body: Some(ResponseBody::Text(body.into())),
            ..Default::default()
        }
    }

    /// JSONボディのレスポンスを作成
    pub fn json(status_code: u16, body: Value) -> Self {
        Self {
            status_code: Some(status_code),
            body: Some(ResponseBody::Json(body)),
            ..Default::default()
        }
    }

    /// シリアライズ可能な値からJSONレスポンスを作成
    pub fn from_serializable<T: Serialize>(
        status_code: u16,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::json(status_code, serde_json::to_value(body)?))
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Cookieを設定する
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Cookieを削除する（即時失効するCookieを送る）
    pub fn delete_cookie(mut self, name: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), String::new());
        self
    }

    /// 実際に返却されるステータスコード
    pub fn effective_status(&self) -> u16 {
        self.status_code.unwrap_or(200)
    }
}
