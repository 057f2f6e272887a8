/// レスポンスビルダー
///
/// ハンドラーが返した`ApiResponse`をフロントドアが期待するワイヤー形式に変換する。
///
/// - テキストボディはそのまま（Content-Type未設定ならtext/plain）
/// - 構造化ボディはJSON文字列（Content-Type未設定ならapplication/json）
/// - Cookieは1つずつSet-Cookie値を構築し、multiValueHeadersに格納
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::domain::{ApiResponse, CookiePolicy, ResponseBody, WireResponse, SET_COOKIE_HEADER};

/// encodeURIComponentと同じくエスケープしない文字を除いた集合
const COOKIE_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// 削除用Cookieの有効期限（即時失効）
const EXPIRED_COOKIE_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// IMF-fixdateで表現できる最後の日時（4桁年の上限）
const LATEST_COOKIE_DATE: &str = "Fri, 31 Dec 9999 23:59:59 GMT";

/// Cookie有効期限の日付書式（IMF-fixdate）
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const CONTENT_TYPE: &str = "Content-Type";

/// 現在時刻を基準にワイヤー形式のレスポンスを構築
pub fn build_response(response: ApiResponse, policy: &CookiePolicy) -> WireResponse {
    build_response_at(response, policy, Utc::now())
}

/// 指定時刻を基準にワイヤー形式のレスポンスを構築
///
/// Cookieの有効期限は`now + policy.max_age`になる。
pub fn build_response_at(
    response: ApiResponse,
    policy: &CookiePolicy,
    now: DateTime<Utc>,
) -> WireResponse {
    let status_code = response.effective_status();
    let mut headers = response.headers;

    let body = match response.body {
        Some(ResponseBody::Text(text)) => {
            set_default_header(&mut headers, CONTENT_TYPE, "text/plain");
            text
        }
        Some(ResponseBody::Json(value)) => {
            set_default_header(&mut headers, CONTENT_TYPE, "application/json");
            value.to_string()
        }
        None => String::new(),
    };

    let set_cookies: Vec<String> = response
        .cookies
        .iter()
        .map(|(name, value)| set_cookie_value(name, value, policy, now))
        .collect();

    let multi_value_headers = if set_cookies.is_empty() {
        None
    } else {
        Some(BTreeMap::from([(SET_COOKIE_HEADER.to_string(), set_cookies)]))
    };

    WireResponse {
        status_code,
        body,
        headers,
        multi_value_headers,
    }
}

/// Set-Cookieヘッダーの値を構築
///
/// 空文字の値は削除（即時失効）を意味する。
/// それ以外は`now + policy.max_age`を有効期限として設定する
/// （4桁年に収まらない場合は9999-12-31 23:59:59に丸める）。
pub fn set_cookie_value(name: &str, value: &str, policy: &CookiePolicy, now: DateTime<Utc>) -> String {
    let expires = if value.is_empty() {
        EXPIRED_COOKIE_DATE.to_string()
    } else {
        now.checked_add_signed(policy.max_age)
            .filter(|expires| (0..=9999).contains(&expires.year()))
            .map(|expires| expires.format(HTTP_DATE_FORMAT).to_string())
            .unwrap_or_else(|| LATEST_COOKIE_DATE.to_string())
    };

    let mut cookie = format!(
        "{}={}; Expires={}",
        name,
        utf8_percent_encode(value, COOKIE_VALUE_ENCODE_SET),
        expires
    );
    if let Some(domain) = &policy.domain {
        cookie.push_str(&format!("; Domain={domain}"));
    }
    if let Some(path) = &policy.path {
        cookie.push_str(&format!("; Path={path}"));
    }
    cookie.push_str(&format!("; HttpOnly; Secure; SameSite={}", policy.same_site));
    cookie
}

/// ヘッダーが未設定（大文字小文字を区別しない）の場合のみ値を設定
fn set_default_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    if !headers.keys().any(|key| key.eq_ignore_ascii_case(name)) {
        headers.insert(name.to_string(), value.to_string());
    }
}
