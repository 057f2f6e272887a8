/// ルートマッチャー
///
/// 登録済みのパスパターン（`{name}`形式のパラメーターを含みうる）と
/// 正規化済みパスから、マッチするルートを1つ選びパスパラメーターを抽出する。
///
/// # 優先順位（最初にマッチしたものを採用）
/// 1. 完全一致
/// 2. 大文字小文字を無視した完全一致
/// 3. セグメント単位のパラメーターマッチ（テーブルの登録順）
///
/// 重複するパターンは詳細度ではなく登録順で解決する。
use std::collections::HashMap;

/// マッチ結果
#[derive(Debug, PartialEq)]
pub struct RouteMatch<'a, T> {
    /// マッチしたパスパターン
    pub pattern: &'a str,
    /// パターンに紐づく値（メソッドごとのハンドラーテーブルなど）
    pub route: &'a T,
    /// パラメーター名から実パスのセグメントへの対応
    pub path_parameters: HashMap<String, String>,
}

/// ルートをマッチングする
///
/// # Arguments
/// * `routes` - 登録順に並んだ (パターン, 値) の列
/// * `path` - 正規化済みのリクエストパス
///
/// # Returns
/// マッチしたルート。どのルールにも該当しない場合は`None`
pub fn match_route<'a, T, I>(routes: I, path: &str) -> Option<RouteMatch<'a, T>>
where
    I: IntoIterator<Item = (&'a str, &'a T)>,
    I::IntoIter: Clone,
{
    let routes = routes.into_iter();

    // 1. 完全一致
    if let Some((pattern, route)) = routes.clone().find(|(pattern, _)| *pattern == path) {
        return Some(RouteMatch {
            pattern,
            route,
            path_parameters: HashMap::new(),
        });
    }

    // 2. 大文字小文字を無視した完全一致
    if let Some((pattern, route)) = routes
        .clone()
        .find(|(pattern, _)| pattern.to_lowercase() == path.to_lowercase())
    {
        return Some(RouteMatch {
            pattern,
            route,
            path_parameters: HashMap::new(),
        });
    }

    // 3. セグメント単位のパラメーターマッチ
    let path_segments: Vec<&str> = path.split('/').collect();
    routes.into_iter().find_map(|(pattern, route)| {
        match_segments(pattern, &path_segments).map(|path_parameters| RouteMatch {
            pattern,
            route,
            path_parameters,
        })
    })
}

/// パターンとパスのセグメントを先頭から比較する
///
/// セグメント数が異なる場合、またはリテラルセグメントが一致しない場合は`None`。
fn match_segments(pattern: &str, path_segments: &[&str]) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut parameters = HashMap::new();
    for (pattern_segment, path_segment) in pattern_segments.iter().zip(path_segments) {
        match parameter_name(pattern_segment) {
            Some(name) => {
                parameters.insert(name.to_string(), path_segment.to_string());
            }
            // リテラルセグメントは大文字小文字を区別する
            None if pattern_segment == path_segment => {}
            None => return None,
        }
    }

    Some(parameters)
}

/// `{name}`形式のセグメントであればパラメーター名を返す
fn parameter_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
