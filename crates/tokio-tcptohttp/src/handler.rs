//! リクエストハンドラー

use tcptohttp::{Request, StatusCode};

/// ハンドラーが返すエラーレスポンス
///
/// サーバーの障害ではなく、ステータスとメッセージを持つ通常の結果。
/// サーバーはこれをステータスライン、デフォルトヘッダー、`message` のボディに変換する。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    /// レスポンスのステータス
    pub status: StatusCode,
    /// レスポンスボディ
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }
}

/// HTTP リクエストハンドラー
///
/// 成功時は `output` にボディを書き込んで `Ok(())` を返す。サーバーが
/// `200 OK` と `output` の長さに合わせたヘッダーを付けて送信する。
///
/// 接続ごとのタスク上で同期的に呼ばれる。
pub trait Handler: Send + Sync + 'static {
    /// リクエストを処理する
    fn handle(&self, output: &mut Vec<u8>, request: &Request) -> Result<(), HandlerError>;
}

/// 関数からハンドラーを作成
impl<F> Handler for F
where
    F: Fn(&mut Vec<u8>, &Request) -> Result<(), HandlerError> + Send + Sync + 'static,
{
    fn handle(&self, output: &mut Vec<u8>, request: &Request) -> Result<(), HandlerError> {
        (self)(output, request)
    }
}
