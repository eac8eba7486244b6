use std::io;

/// リクエストのパースおよびレスポンス書き出しのエラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// スタートラインが 3 トークンでない
    #[error("malformed start line: {0:?}")]
    MalformedStartLine(String),
    /// HTTP/1.1 以外のバージョン
    #[error("unsupported http version: {0:?}")]
    UnsupportedHttpVersion(String),
    /// バージョントークンに `/` がない
    #[error("malformed http format: {0:?}")]
    MalformedHttpFormat(String),
    /// フィールド行にコロンがない、または値が UTF-8 でない
    #[error("malformed field line")]
    MalformedFieldLine,
    /// フィールド名に空白やトークン以外の文字が含まれる
    #[error("malformed field name: {0:?}")]
    MalformedFieldName(String),
    /// ヘッダーセクションの終端前にストリームが終わった
    #[error("truncated request: stream ended before the header section was complete")]
    TruncatedRequest,
    /// Content-Length とボディ長が一致しない
    #[error("body length mismatch: content-length {declared}, received {actual}")]
    BodyLengthMismatch { declared: usize, actual: usize },
    /// Content-Length が数値として解釈できない
    #[error("invalid content-length: {0:?}")]
    InvalidContentLength(String),
    /// 行長の上限超過
    #[error("line too long: {size} > {limit}")]
    LineTooLong { size: usize, limit: usize },
    /// ヘッダー数の上限超過
    #[error("too many headers: {count} > {limit}")]
    TooManyHeaders { count: usize, limit: usize },
    /// ボディサイズの上限超過
    #[error("body too large: {size} > {limit}")]
    BodyTooLarge { size: usize, limit: usize },
    /// 完了済みのパーサーに対する finish 呼び出し
    #[error("request parser already finished")]
    ParserFinished,
    /// サポートしていないステータスコード
    #[error("unsupported status code: {0}")]
    UnsupportedStatus(u16),
    /// トランスポートの I/O エラー
    #[error("transport error: {0}")]
    TransportError(#[from] io::Error),
}

impl Error {
    /// 相手側から受け取ったバイト列が原因のエラーかどうか
    ///
    /// true の場合は 400 Bad Request で応答できる。
    pub fn is_parse_error(&self) -> bool {
        !matches!(
            self,
            Error::TransportError(_) | Error::UnsupportedStatus(_) | Error::ParserFinished
        )
    }
}
