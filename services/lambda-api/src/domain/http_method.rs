// HTTPメソッド
//
// ルートテーブルがメソッドごとのハンドラースロットを持つための
// 既知HTTP動詞の列挙型。

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 既知のHTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// 未知のHTTPメソッド文字列
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethodError(pub String);

impl HttpMethod {
    /// 全メソッド（ルートテーブルのスロット順）
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// 大文字のメソッド名を返す
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownMethodError;

    /// 大文字小文字を区別せずにメソッド名をパースする
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMethodError(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
