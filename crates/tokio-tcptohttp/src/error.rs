//! tokio-tcptohttp エラー型

/// tokio-tcptohttp エラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O エラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP パースエラー
    #[error("HTTP error: {0}")]
    Http(#[from] tcptohttp::Error),
    /// 読み書きのタイムアウト
    #[error("connection timeout")]
    Timeout,
    /// accept ループのタスクが異常終了した
    #[error("accept loop task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// 400 Bad Request で応答すべきエラーか
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_parse_error())
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
