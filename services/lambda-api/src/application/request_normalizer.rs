/// リクエストノーマライザー
///
/// フロントドア（API Gatewayイベント、HTTPアダプター）から受け取った
/// 生イベントを正規化済みの`ApiRequest`に変換する。
/// すべて副作用のない純粋関数で、失敗しない。
use std::collections::HashMap;

use base64::{engine::general_purpose, Engine};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::domain::{ApiRequest, RawEvent, RequestBody};

/// フォームデータのContent-Type
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// 生イベントを正規化済みリクエストに変換
///
/// `path_parameters`は空のまま返す（ルートマッチ後に設定される）。
pub fn normalize(event: &RawEvent) -> ApiRequest {
    let method = event
        .http_method
        .as_deref()
        .map(|method| method.trim().to_ascii_uppercase())
        .unwrap_or_default();
    let path = normalize_path(event.path.as_deref().unwrap_or_default());
    let query = normalize_query(event.query_string_parameters.as_ref());
    let headers = normalize_headers(event.headers.as_ref());
    let cookies = parse_cookie(&headers);
    let content_type = headers.get("content-type").map(String::as_str);
    let body = parse_body(event.body.as_deref(), event.is_base64_encoded, content_type);

    ApiRequest {
        method,
        path,
        query,
        headers,
        cookies,
        body,
        path_parameters: HashMap::new(),
    }
}

/// パスを正規化する
///
/// 空セグメント（連続スラッシュ・末尾スラッシュ）を除去し、各セグメントを
/// 小文字化して先頭スラッシュ1つで連結する。`""`と`"/"`は`"/"`になる。
///
/// # 例
/// ```
/// use lambda_api::application::normalize_path;
///
/// assert_eq!(normalize_path("/a//B/"), "/a/b");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(raw: &str) -> String {
    let segments: Vec<String> = raw
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect();

    format!("/{}", segments.join("/"))
}

/// クエリパラメーターを正規化する
///
/// 値が空でない文字列のキーのみを残す。入力がない場合は空のマップ。
pub fn normalize_query(raw: Option<&HashMap<String, Option<String>>>) -> HashMap<String, String> {
    raw.into_iter()
        .flatten()
        .filter_map(|(key, value)| match value.as_deref() {
            Some(value) if !value.is_empty() => Some((key.clone(), value.to_string())),
            _ => None,
        })
        .collect()
}

/// ヘッダーを正規化する
///
/// 値が空でないヘッダーを、元のキーと小文字化したキーの両方で格納する。
///
/// 小文字キーが衝突した場合（`Cookie`と`cookie`など）は、元から小文字のキーの値を優先し、
/// それ以外は名前順で最初のものを採用する。
pub fn normalize_headers(raw: Option<&HashMap<String, Option<String>>>) -> HashMap<String, String> {
    let mut entries: Vec<(&String, &str)> = raw
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|value| !value.is_empty())
                .map(|value| (name, value))
        })
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut headers = HashMap::new();
    for (name, value) in entries {
        let lowercase = name.to_ascii_lowercase();
        if lowercase == *name {
            headers.insert(lowercase, value.to_string());
        } else {
            headers.entry(lowercase).or_insert_with(|| value.to_string());
            headers.insert(name.clone(), value.to_string());
        }
    }
    headers
}

/// リクエストボディを解析する
///
/// # 処理フロー
/// 1. ボディがない（空文字を含む）場合は空オブジェクト
/// 2. Base64エンコードされていればデコード
/// 3. `application/x-www-form-urlencoded`ならフォームデータとしてパース
/// 4. それ以外はJSONとしてパース
///
/// パースに失敗した場合はデコード済みの生テキストを返す。
pub fn parse_body(raw: Option<&str>, is_base64_encoded: bool, content_type: Option<&str>) -> RequestBody {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return RequestBody::empty();
    };

    let text = if is_base64_encoded {
        match general_purpose::STANDARD.decode(raw) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => return RequestBody::Raw(raw.to_string()),
        }
    } else {
        raw.to_string()
    };

    if content_type.is_some_and(is_form_urlencoded) {
        return RequestBody::Structured(parse_form(&text));
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => RequestBody::Structured(value),
        Err(_) => RequestBody::Raw(text),
    }
}

/// Cookieヘッダーを解析する
///
/// `Cookie`ヘッダー（大文字小文字を区別しない）を`name=value`の組に分解する。
/// ダブルクォートで囲まれた値は外し、パーセントエンコードをデコードする。
/// 同名のCookieは最初の値を採用する。
pub fn parse_cookie(headers: &HashMap<String, String>) -> HashMap<String, String> {
    let header = headers.get("cookie").or_else(|| {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("cookie"))
            .map(|(_, value)| value)
    });

    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };

    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || cookies.contains_key(name) {
            continue;
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(value);
        let value = percent_decode_str(value)
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| value.to_string());

        cookies.insert(name.to_string(), value);
    }

    cookies
}

/// Content-Typeがフォームデータかどうか（charsetなどのパラメーターは無視）
fn is_form_urlencoded(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}

/// フォームデータをフラットなオブジェクトに変換（同名キーは後勝ち）
fn parse_form(text: &str) -> Value {
    let fields: Map<String, Value> = url::form_urlencoded::parse(text.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_map(entries: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
            .collect()
    }

    // ===========================================
    // normalize_path
    // ===========================================

    #[test]
    fn test_normalize_path_examples() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/a//b/"), "/a/b");
        assert_eq!(normalize_path("PATH"), "/path");
        assert_eq!(normalize_path("///"), "/");
        assert_eq!(normalize_path("/Users/42/Orders/"), "/users/42/orders");
    }

    /// 正規化は冪等
    #[test]
    fn test_normalize_path_is_idempotent() {
        let inputs = ["", "/", "//a///B//", "PATH", "/x/Y/z/", "a/b", "/ÄÖ/ü", "/{id}/"];
        for input in inputs {
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once, "input: {input:?}");
        }
    }

    /// 正規化後のパスは空でなく、連続スラッシュや大文字を含まない
    #[test]
    fn test_normalize_path_invariants() {
        for input in ["", "//", "/A//B", "C/", "/d/E/f//"] {
            let path = normalize_path(input);
            assert!(path.starts_with('/'));
            assert!(!path.contains("//"));
            assert_eq!(path, path.to_lowercase());
            assert!(path == "/" || !path.ends_with('/'));
        }
    }

    // ===========================================
    // normalize_query / normalize_headers
    // ===========================================

    #[test]
    fn test_normalize_query_drops_empty_values() {
        let raw = raw_map(&[("a", Some("1")), ("b", Some("2")), ("c", None), ("d", Some(""))]);

        let query = normalize_query(Some(&raw));
        assert_eq!(
            query,
            HashMap::from([
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
        );
    }

    #[test]
    fn test_normalize_query_none_is_empty() {
        assert!(normalize_query(None).is_empty());
    }

    #[test]
    fn test_normalize_headers_stores_both_cases() {
        let raw = raw_map(&[("Cookie", Some("1")), ("Content-Type", Some("2"))]);

        let headers = normalize_headers(Some(&raw));
        assert_eq!(headers.get("Cookie").map(String::as_str), Some("1"));
        assert_eq!(headers.get("cookie").map(String::as_str), Some("1"));
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("2"));
        assert_eq!(headers.get("content-type").map(String::as_str), Some("2"));
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_normalize_headers_drops_empty_values() {
        let raw = raw_map(&[("X-Empty", Some("")), ("X-Null", None), ("accept", Some("*/*"))]);

        let headers = normalize_headers(Some(&raw));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept").map(String::as_str), Some("*/*"));
        assert!(normalize_headers(None).is_empty());
    }

    /// 小文字キーの衝突は元から小文字のキーが優先される
    #[test]
    fn test_normalize_headers_lowercase_source_wins() {
        let raw = raw_map(&[
            ("Cookie", Some("mixed=1")),
            ("COOKIE", Some("upper=1")),
            ("cookie", Some("lower=1")),
        ]);

        // HashMapの走査順に依存しないことを繰り返して確認
        for _ in 0..32 {
            let raw: HashMap<_, _> = raw.clone().into_iter().collect();
            let headers = normalize_headers(Some(&raw));
            assert_eq!(headers.get("cookie").map(String::as_str), Some("lower=1"));
            assert_eq!(headers.get("Cookie").map(String::as_str), Some("mixed=1"));
            assert_eq!(headers.get("COOKIE").map(String::as_str), Some("upper=1"));
            assert_eq!(parse_cookie(&headers).get("lower").map(String::as_str), Some("1"));
        }

        // 小文字キーがない場合は名前順で最初のもの
        let raw = raw_map(&[("X-Trace", Some("b")), ("X-TRACE", Some("a"))]);
        let headers = normalize_headers(Some(&raw));
        assert_eq!(headers.get("x-trace").map(String::as_str), Some("a"));
    }

    // ===========================================
    // parse_body
    // ===========================================

    #[test]
    fn test_parse_body_json() {
        let body = parse_body(Some(r#"{"a":"1"}"#), false, Some("application/json"));
        assert_eq!(body, RequestBody::Structured(json!({"a": "1"})));
    }

    /// Content-Typeがなくても JSON として解釈を試みる
    #[test]
    fn test_parse_body_json_without_content_type() {
        let body = parse_body(Some("[1,2]"), false, None);
        assert_eq!(body, RequestBody::Structured(json!([1, 2])));
    }

    #[test]
    fn test_parse_body_malformed_json_returns_raw_text() {
        let body = parse_body(Some(r#"{"a":"#), false, Some("application/json"));
        assert_eq!(body, RequestBody::Raw(r#"{"a":"#.to_string()));
    }

    #[test]
    fn test_parse_body_empty_returns_empty_object() {
        assert_eq!(parse_body(None, false, None), RequestBody::Structured(json!({})));
        assert_eq!(parse_body(Some(""), false, None), RequestBody::Structured(json!({})));
    }

    #[test]
    fn test_parse_body_form_urlencoded() {
        let body = parse_body(
            Some("name=Jane+Doe&city=T%C5%8Dky%C5%8D"),
            false,
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        assert_eq!(body, RequestBody::Structured(json!({"name": "Jane Doe", "city": "Tōkyō"})));
    }

    #[test]
    fn test_parse_body_base64_json() {
        let encoded = general_purpose::STANDARD.encode(r#"{"x":1}"#);
        let body = parse_body(Some(&encoded), true, Some("application/json"));
        assert_eq!(body, RequestBody::Structured(json!({"x": 1})));
    }

    #[test]
    fn test_parse_body_base64_form() {
        let encoded = general_purpose::STANDARD.encode("a=1&b=2");
        let body = parse_body(Some(&encoded), true, Some(FORM_URLENCODED));
        assert_eq!(body, RequestBody::Structured(json!({"a": "1", "b": "2"})));
    }

    /// デコード済みテキストがJSONでなければテキストとして返す
    #[test]
    fn test_parse_body_base64_plain_text() {
        let encoded = general_purpose::STANDARD.encode("hello world");
        let body = parse_body(Some(&encoded), true, Some("text/plain"));
        assert_eq!(body, RequestBody::Raw("hello world".to_string()));
    }

    /// Base64として不正な入力は元の文字列を返す
    #[test]
    fn test_parse_body_invalid_base64_returns_raw() {
        let body = parse_body(Some("not base64!"), true, None);
        assert_eq!(body, RequestBody::Raw("not base64!".to_string()));
    }

    // ===========================================
    // parse_cookie
    // ===========================================

    fn headers_with_cookie(name: &str, value: &str) -> HashMap<String, String> {
        normalize_headers(Some(&raw_map(&[(name, Some(value))])))
    }

    #[test]
    fn test_parse_cookie() {
        let headers = headers_with_cookie("Cookie", "session=abc123; theme=dark");

        let cookies = parse_cookie(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["session"], "abc123");
        assert_eq!(cookies["theme"], "dark");
    }

    #[test]
    fn test_parse_cookie_header_name_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("COOKIE".to_string(), "a=1".to_string());

        assert_eq!(parse_cookie(&headers)["a"], "1");
    }

    #[test]
    fn test_parse_cookie_decodes_and_unquotes() {
        let headers = headers_with_cookie("cookie", r#"name="J%C3%BCrgen"; path=%2Fhome; bad=%E0%A4%A"#);

        let cookies = parse_cookie(&headers);
        assert_eq!(cookies["name"], "Jürgen");
        assert_eq!(cookies["path"], "/home");
        // デコードできない値はそのまま
        assert_eq!(cookies["bad"], "%E0%A4%A");
    }

    /// 同名Cookieは最初の値、`=`のない断片は無視
    #[test]
    fn test_parse_cookie_first_wins_and_skips_garbage() {
        let headers = headers_with_cookie("Cookie", "a=1; junk; a=2; =x; b=");

        let cookies = parse_cookie(&headers);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "");
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_parse_cookie_absent() {
        assert!(parse_cookie(&HashMap::new()).is_empty());
    }

    // ===========================================
    // normalize
    // ===========================================

    #[test]
    fn test_normalize_event() {
        let event = RawEvent {
            http_method: Some("post".to_string()),
            path: Some("/Orders//42/".to_string()),
            headers: Some(raw_map(&[
                ("Content-Type", Some("application/json")),
                ("Cookie", Some("sid=s1")),
            ])),
            query_string_parameters: Some(raw_map(&[("expand", Some("items")), ("empty", Some(""))])),
            body: Some(r#"{"qty":2}"#.to_string()),
            is_base64_encoded: false,
        };

        let request = normalize(&event);
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/orders/42");
        assert_eq!(request.query_parameter("expand"), Some("items"));
        assert_eq!(request.query_parameter("empty"), None);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.cookie("sid"), Some("s1"));
        assert_eq!(request.body, RequestBody::Structured(json!({"qty": 2})));
        assert!(request.path_parameters.is_empty());
    }

    #[test]
    fn test_normalize_empty_event() {
        let request = normalize(&RawEvent::default());
        assert_eq!(request.method, "");
        assert_eq!(request.path, "/");
        assert!(request.query.is_empty());
        assert!(request.headers.is_empty());
        assert!(request.cookies.is_empty());
        assert_eq!(request.body, RequestBody::empty());
    }
}
