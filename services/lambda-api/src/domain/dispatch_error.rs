// ディスパッチエラー
//
// ハンドラー呼び出しで発生した失敗をエラーハンドラーへ渡すための型。

use thiserror::Error;

/// アプリケーションのハンドラーが返すエラー型
///
/// Lambdaランタイムのエラー型と同じ形で、任意のエラーを`?`で返せる。
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// ハンドラー呼び出しの失敗
#[derive(Debug, Error)]
pub enum DispatchError {
    /// ハンドラーがエラーを返した
    #[error("handler failed: {0}")]
    Handler(BoxError),

    /// ハンドラーがpanicした
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl DispatchError {
    /// panicのペイロードからエラーを作成
    ///
    /// `panic!`の引数が文字列であればそのメッセージを保持する。
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        DispatchError::Panic(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[test]
    fn test_handler_error_display() {
        let error = DispatchError::Handler("database unavailable".into());
        assert_eq!(error.to_string(), "handler failed: database unavailable");
    }

    #[test]
    fn test_from_panic_with_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let error = DispatchError::from_panic(payload);
        assert_eq!(error.to_string(), "handler panicked: boom");
    }

    #[test]
    fn test_from_panic_with_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(format!("item {} missing", 7));
        let error = DispatchError::from_panic(payload);
        assert!(matches!(error, DispatchError::Panic(ref message) if message == "item 7 missing"));
    }

    #[test]
    fn test_from_panic_with_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        let error = DispatchError::from_panic(payload);
        assert_eq!(error.to_string(), "handler panicked: unknown panic payload");
    }
}
