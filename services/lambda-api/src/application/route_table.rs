// ルートテーブル
//
// パスパターンからメソッドごとのハンドラーテーブルへの順序付きマッピング。
// イテレーション順は登録順で、ルートマッチャーの同順位解決に使われる。

use std::fmt;
use std::sync::Arc;

use crate::application::handler::{PingHandler, RouteHandler};
use crate::domain::{match_route, HttpMethod, RouteMatch};

/// メソッドごとのハンドラーテーブル
///
/// 既知のHTTPメソッドそれぞれに、ハンドラーを1つ登録できるスロットを持つ。
/// 未登録のスロットは「ハンドラーなし」（405の対象）を表す。
#[derive(Clone, Default)]
pub struct MethodRoutes {
    get: Option<Arc<dyn RouteHandler>>,
    post: Option<Arc<dyn RouteHandler>>,
    put: Option<Arc<dyn RouteHandler>>,
    patch: Option<Arc<dyn RouteHandler>>,
    delete: Option<Arc<dyn RouteHandler>>,
    head: Option<Arc<dyn RouteHandler>>,
    options: Option<Arc<dyn RouteHandler>>,
}

impl MethodRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定メソッドのハンドラーを登録する（既存の登録は置き換える）
    pub fn on(mut self, method: HttpMethod, handler: impl RouteHandler + 'static) -> Self {
        *self.slot_mut(method) = Some(Arc::new(handler));
        self
    }

    pub fn get(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Get, handler)
    }

    pub fn post(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Post, handler)
    }

    pub fn put(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Put, handler)
    }

    pub fn patch(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Patch, handler)
    }

    pub fn delete(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Delete, handler)
    }

    pub fn head(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Head, handler)
    }

    pub fn options(self, handler: impl RouteHandler + 'static) -> Self {
        self.on(HttpMethod::Options, handler)
    }

    /// 指定メソッドのハンドラーを取得
    pub fn handler(&self, method: HttpMethod) -> Option<&Arc<dyn RouteHandler>> {
        self.slot(method).as_ref()
    }

    /// メソッド文字列からハンドラーを取得
    ///
    /// 未知のメソッドは常に「ハンドラーなし」として扱う。
    pub fn handler_for(&self, method: &str) -> Option<&Arc<dyn RouteHandler>> {
        method.parse().ok().and_then(|method| self.handler(method))
    }

    /// ハンドラーが登録されているメソッドの一覧
    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|method| self.slot(*method).is_some())
            .collect()
    }

    fn slot(&self, method: HttpMethod) -> &Option<Arc<dyn RouteHandler>> {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Post => &self.post,
            HttpMethod::Put => &self.put,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Head => &self.head,
            HttpMethod::Options => &self.options,
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Arc<dyn RouteHandler>> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
        }
    }
}

impl fmt::Debug for MethodRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRoutes")
            .field("allowed_methods", &self.allowed_methods())
            .finish()
    }
}

/// ルートテーブル
///
/// パスパターン（`{name}`形式のパラメーターを含みうる）から
/// `MethodRoutes`への登録順を保持したマッピング。
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<(String, MethodRoutes)>,
}

impl RouteTable {
    /// 空のルートテーブル
    pub fn new() -> Self {
        Self::default()
    }

    /// ルートを登録する
    ///
    /// 同じパターンが既に登録されている場合は、その位置のまま置き換える。
    pub fn route(mut self, pattern: impl Into<String>, methods: MethodRoutes) -> Self {
        let pattern = pattern.into();
        match self.routes.iter_mut().find(|(existing, _)| *existing == pattern) {
            Some((_, existing)) => *existing = methods,
            None => self.routes.push((pattern, methods)),
        }
        self
    }

    /// 正規化済みパスにマッチするルートを探す
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_, MethodRoutes>> {
        match_route(
            self.routes.iter().map(|(pattern, methods)| (pattern.as_str(), methods)),
            path,
        )
    }

    /// 登録順のパターン一覧
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(pattern, _)| pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// デフォルトのルートテーブル（`GET /ping`のみ）
    pub fn ping() -> Self {
        Self::new().route("/ping", MethodRoutes::new().get(PingHandler))
    }
}
