use crate::headers::HeaderMap;

/// リクエストライン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP メソッド (GET, POST, etc.)
    pub method: String,
    /// リクエストターゲット
    pub target: String,
    /// HTTP バージョン (`HTTP/` を除いた部分、常に "1.1")
    pub http_version: String,
}

/// パース済みの HTTP リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// リクエストライン
    pub request_line: RequestLine,
    /// ヘッダー
    pub headers: HeaderMap,
    /// ボディ
    pub body: Vec<u8>,
}

impl Request {
    /// HTTP メソッド
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    /// リクエストターゲット
    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
