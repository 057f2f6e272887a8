/// HTTPアダプター
///
/// Lambda Function URL / HTTP API（lambda_http経由）で受けた`http::Request`を
/// `RawEvent`に詰め替え、ディスパッチ結果の`WireResponse`を`http::Response`に戻す。
///
/// Set-Cookieは値ごとに1行のヘッダーとして出力する（lambda_httpが
/// Function URL / HTTP APIの`cookies`配列に振り分ける）。
use std::collections::HashMap;

use base64::{engine::general_purpose, Engine};
use lambda_http::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, SET_COOKIE};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, Response};
use thiserror::Error;

use crate::domain::{RawEvent, WireResponse};

/// レスポンス変換エラー
#[derive(Debug, Error)]
pub enum HttpAdapterError {
    #[error("invalid status code: {0}")]
    InvalidStatus(u16),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("invalid header value for {0}")]
    InvalidHeaderValue(String),
}

/// HTTPリクエストを生イベントに変換
///
/// - 同名ヘッダーは`, `で連結（cookieのみ`; `）
/// - UTF-8として読めないバイナリボディはBase64にしてフラグを立てる
pub fn from_http_request(request: &Request) -> RawEvent {
    let mut headers: HashMap<String, Option<String>> = HashMap::new();
    for (name, value) in request.headers() {
        let Ok(value) = value.to_str() else {
            continue;
        };
        let separator = if *name == COOKIE { "; " } else { ", " };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                if let Some(existing) = existing {
                    existing.push_str(separator);
                    existing.push_str(value);
                }
            })
            .or_insert_with(|| Some(value.to_string()));
    }

    let query: HashMap<String, Option<String>> = request
        .uri()
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), Some(value.into_owned())))
                .collect()
        })
        .unwrap_or_default();

    let (body, is_base64_encoded) = match request.body() {
        Body::Text(text) => (Some(text.clone()), false),
        Body::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => (Some(text.to_string()), false),
            Err(_) => (Some(general_purpose::STANDARD.encode(bytes)), true),
        },
        _ => (None, false),
    };

    RawEvent {
        http_method: Some(request.method().as_str().to_string()),
        path: Some(request.uri().path().to_string()),
        headers: Some(headers),
        query_string_parameters: Some(query),
        body,
        is_base64_encoded,
    }
}

/// ワイヤー形式のレスポンスをHTTPレスポンスに変換
pub fn into_http_response(wire: WireResponse) -> Result<Response<Body>, HttpAdapterError> {
    let status = StatusCode::from_u16(wire.status_code)
        .map_err(|_| HttpAdapterError::InvalidStatus(wire.status_code))?;

    let mut response = Response::new(if wire.body.is_empty() {
        Body::Empty
    } else {
        Body::Text(wire.body.clone())
    });
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &wire.headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|_| HttpAdapterError::InvalidHeaderName(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| HttpAdapterError::InvalidHeaderValue(name.clone()))?;
        headers.insert(header_name, header_value);
    }
    for cookie in wire.set_cookies() {
        let header_value = HeaderValue::from_str(cookie)
            .map_err(|_| HttpAdapterError::InvalidHeaderValue(SET_COOKIE.to_string()))?;
        headers.append(SET_COOKIE, header_value);
    }

    Ok(response)
}

/// 変換できないレスポンスの代わりに返す500
pub fn internal_server_error() -> Response<Body> {
    let mut response = Response::new(Body::Text("Internal server error".to_string()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
