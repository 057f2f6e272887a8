// Cookie属性設定
//
// レスポンスで設定するCookieの属性（有効期限、SameSiteなど）を型安全に保持し、
// 環境変数からの読み込みとデフォルト値を提供するドメイン層コンポーネント。

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use tracing::{info, warn};

// ===========================================
// デフォルト値定義
// ===========================================

/// Cookieの有効期間（日）（約1年）
pub const DEFAULT_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Cookieの有効期間（日）の上限（RFC 6265bisでブラウザが許容する最大値）
pub const MAX_COOKIE_MAX_AGE_DAYS: i64 = 400;

// ===========================================
// 環境変数名定義
// ===========================================

/// 環境変数名: Cookieの有効期間（日）
pub const ENV_COOKIE_MAX_AGE_DAYS: &str = "COOKIE_MAX_AGE_DAYS";

/// 環境変数名: SameSite属性
pub const ENV_COOKIE_SAME_SITE: &str = "COOKIE_SAME_SITE";

/// 環境変数名: Domain属性
pub const ENV_COOKIE_DOMAIN: &str = "COOKIE_DOMAIN";

/// 環境変数名: Path属性
pub const ENV_COOKIE_PATH: &str = "COOKIE_PATH";

/// SameSite属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("invalid SameSite value: {other}")),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        };
        f.write_str(value)
    }
}

/// Cookie属性設定
///
/// SecureとHttpOnlyは常に付与する。
#[derive(Debug, Clone, PartialEq)]
pub struct CookiePolicy {
    /// 設定Cookieの有効期間
    pub max_age: Duration,
    pub same_site: SameSite,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(DEFAULT_COOKIE_MAX_AGE_DAYS),
            same_site: SameSite::Strict,
            domain: None,
            path: None,
        }
    }
}

impl CookiePolicy {
    /// 環境変数から設定を読み込み
    ///
    /// 未設定、またはパースエラーの場合はデフォルト値を使用する。
    ///
    /// # 環境変数
    /// - COOKIE_MAX_AGE_DAYS: 有効期間（日、1〜400）
    /// - COOKIE_SAME_SITE: Strict / Lax / None
    /// - COOKIE_DOMAIN: Domain属性（空文字は未設定扱い）
    /// - COOKIE_PATH: Path属性（空文字は未設定扱い）
    pub fn from_env() -> Self {
        let max_age_days = parse_env_max_age_days(ENV_COOKIE_MAX_AGE_DAYS, DEFAULT_COOKIE_MAX_AGE_DAYS);
        let same_site = parse_env_same_site(ENV_COOKIE_SAME_SITE);
        let domain = get_optional_string(ENV_COOKIE_DOMAIN);
        let path = get_optional_string(ENV_COOKIE_PATH);

        info!(
            max_age_days,
            same_site = %same_site,
            domain = ?domain,
            path = ?path,
            "CookiePolicy loaded"
        );

        Self {
            max_age: Duration::days(max_age_days),
            same_site,
            domain,
            path,
        }
    }
}

/// 文字列オプションを読み込む（空文字はNone扱い）
fn get_optional_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// 有効期間（日）を読み込む
///
/// 1〜`MAX_COOKIE_MAX_AGE_DAYS`の範囲外はパースエラーと同様にデフォルト値を使用する。
fn parse_env_max_age_days(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(value) => match value.trim().parse::<i64>() {
            Ok(parsed) if (1..=MAX_COOKIE_MAX_AGE_DAYS).contains(&parsed) => parsed,
            _ => {
                warn!(
                    key,
                    value = %value,
                    default,
                    "Environment variable parse error, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_same_site(key: &str) -> SameSite {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|err: String| {
            warn!(key, error = %err, "Environment variable parse error, using default");
            SameSite::default()
        }),
        Err(_) => SameSite::default(),
    }
}
