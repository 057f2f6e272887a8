/// 正規化済みリクエスト
///
/// フロントドアから受け取った生イベントをリクエストノーマライザーが変換した
/// 内部表現。生成後は不変で、`path_parameters`のみルートマッチ後に
/// ディスパッチャーが一度だけ設定する。
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// リクエストボディ
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSONまたはフォームデータとしてパースできた構造化値
    Structured(Value),
    /// パースに失敗した場合の生テキスト
    Raw(String),
}

impl RequestBody {
    /// 空のオブジェクト（ボディなしの場合の値）
    pub fn empty() -> Self {
        RequestBody::Structured(Value::Object(Default::default()))
    }

    /// 構造化値であれば参照を返す
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RequestBody::Structured(value) => Some(value),
            RequestBody::Raw(_) => None,
        }
    }

    /// 生テキストであれば参照を返す
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            RequestBody::Structured(_) => None,
            RequestBody::Raw(text) => Some(text),
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

/// 正規化済みHTTPリクエスト
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    /// 大文字のHTTPメソッド
    pub method: String,
    /// 正規化済みパス（先頭スラッシュ1つ、小文字、末尾スラッシュなし）
    pub path: String,
    /// 空でない値のみを持つクエリパラメーター
    pub query: HashMap<String, String>,
    /// 元のキーと小文字キーの両方で格納されたヘッダー
    pub headers: HashMap<String, String>,
    /// Cookieヘッダーから解析したCookie
    pub cookies: HashMap<String, String>,
    /// リクエストボディ
    pub body: RequestBody,
    /// マッチしたルートパターンから抽出したパスパラメーター
    pub path_parameters: HashMap<String, String>,
}

impl ApiRequest {
    /// ヘッダー値を大文字小文字を区別せずに取得
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// 構造化ボディを任意の型にデシリアライズする
    ///
    /// ボディが生テキストの場合は、そのテキストをJSONとして再度パースする。
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            RequestBody::Structured(value) => serde_json::from_value(value.clone()),
            RequestBody::Raw(text) => serde_json::from_str(text),
        }
    }
}
